#![deny(missing_docs)]
//! Provider lifecycle-event extension system (C2/C3/C4) for the neuron
//! orchestration runtime.
//!
//! An agent's [`neuron_runtime::ProviderConfig`] values name a provider
//! class and a [`neuron_runtime::Scope`]; this crate gives that
//! configuration behaviour. [`Provider`] is the trait a provider
//! implements; [`ProviderManager`] materialises instances per scope,
//! fans lifecycle events out to subscribers in priority order, and folds
//! the [`ContextPatch`]es they return.
//!
//! Nothing here drives a turn or calls a model — that's
//! `neuron-orchestrator`. This crate only answers "who gets notified,
//! in what order, with what shared state, and what do they hand back".

pub mod builtin;
pub mod event;
pub mod manager;
pub mod patch;
pub mod provider;

pub use event::{Event, EventKind};
pub use manager::{MaterializeResult, ProviderManager};
pub use patch::ContextPatch;
pub use provider::{Provider, ProviderError, ProviderFactory};
