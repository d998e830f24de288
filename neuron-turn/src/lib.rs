#![deny(missing_docs)]
//! The model-client contract: the boundary between the orchestrator and
//! whatever language-model backend answers a turn (§6 Model adapter
//! contract). Concrete adapters (Anthropic, OpenAI, Ollama, a test
//! double) implement [`ModelClient`]; this crate owns none of them —
//! they are external collaborators per spec §1.
//!
//! Key items defined here:
//! - [`ModelClient`] — the model-adapter trait (not object-safe; uses
//!   RPITIT)
//! - the wire types (`ModelRequest`/`ModelResponse`/`ToolSchema`/`Role`/
//!   `StopReason`/`TokenUsage`)

pub mod client;
pub mod convert;
pub mod types;

pub use client::{ModelClient, ModelClientError};
pub use convert::{
    content_block_to_part, content_part_to_block, content_to_parts, content_to_user_message,
    parts_to_content,
};
pub use types::*;
