#![deny(missing_docs)]
//! Core data model for the neuron orchestration runtime.
//!
//! This crate holds the record types threaded through a `run` call —
//! [`Agent`], [`Message`], [`ToolDescriptor`], [`RunContext`],
//! [`RunResult`] — and the provider configuration vocabulary
//! ([`ProviderConfig`], [`Scope`]) that [`Agent`] carries but that only
//! `neuron-providers` gives behaviour to.
//!
//! Nothing here executes a tool, calls a model, or dispatches an event —
//! those live in `neuron-tool`, `neuron-turn`, `neuron-providers`, and
//! `neuron-orchestrator`. This crate is the shared vocabulary they all
//! speak, one level above `layer0`.

pub mod agent;
pub mod context;
pub mod message;
pub mod provider_config;
pub mod tool;

pub use agent::{Agent, Instructions, ParallelToolCalls, ToolChoice};
pub use context::{ContextVariables, RunContext, RunResult, TerminationReason};
pub use message::{Message, MessageInfo, Role, ToolCall};
pub use provider_config::{ProviderConfig, Scope};
pub use tool::ToolDescriptor;
