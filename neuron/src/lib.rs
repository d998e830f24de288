#![deny(missing_docs)]
//! # neuron — umbrella crate
//!
//! A single import surface for the neuron multi-agent orchestration
//! runtime. Re-exports each crate in the workspace behind a feature flag,
//! plus a [`prelude`] for the happy path: build an agent table, run it
//! through [`neuron_orchestrator::Orchestrator`].

#[cfg(feature = "core")]
pub use layer0;
#[cfg(feature = "control")]
pub use neuron_control;
#[cfg(feature = "orchestrator")]
pub use neuron_orchestrator;
#[cfg(feature = "providers")]
pub use neuron_providers;
#[cfg(feature = "core")]
pub use neuron_runtime;
#[cfg(feature = "core")]
pub use neuron_tool;
#[cfg(feature = "core")]
pub use neuron_turn;

/// Happy-path imports for composing neuron runs.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use layer0::RunError;

    #[cfg(feature = "core")]
    pub use neuron_runtime::{
        Agent, ContextVariables, Instructions, Message, ParallelToolCalls, ProviderConfig,
        Role, RunContext, RunResult, Scope, TerminationReason, ToolCall, ToolChoice,
        ToolDescriptor,
    };

    #[cfg(feature = "core")]
    pub use neuron_tool::{ToolDyn, ToolError, ToolRegistry};

    #[cfg(feature = "core")]
    pub use neuron_turn::{ModelClient, ModelClientError, ModelRequest, ModelResponse};

    #[cfg(feature = "providers")]
    pub use neuron_providers::{ContextPatch, Event, EventKind, Provider, ProviderError, ProviderManager};

    #[cfg(feature = "orchestrator")]
    pub use neuron_orchestrator::{Orchestrator, OrchestratorConfig, RunInput};

    #[cfg(feature = "control")]
    pub use neuron_control::{ControlHandle, PauseGate};
}
