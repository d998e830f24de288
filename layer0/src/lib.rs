//! # layer0 — wire-stable primitives for the orchestration runtime
//!
//! This crate holds the types every other crate in the workspace needs
//! and none of them should own: message content, durations, typed ids,
//! the cross-cutting lifecycle event vocabulary (budget, compaction),
//! and the run error taxonomy.
//!
//! Nothing in here knows about agents, turns, or providers — those live
//! in `neuron-runtime` and `neuron-providers`. This crate is the floor.

#![deny(missing_docs)]

pub mod content;
pub mod duration;
pub mod error;
pub mod id;
pub mod lifecycle;

pub use content::{Content, ContentBlock};
pub use duration::DurationMs;
pub use error::RunError;
pub use id::{AgentId, RunId, ScopeId, SessionId, ToolCallId};
pub use lifecycle::{BudgetEvent, CompactionEvent};
