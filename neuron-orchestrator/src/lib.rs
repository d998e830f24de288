#![deny(missing_docs)]
//! The multi-agent turn loop (C6, §4.1) for the neuron orchestration
//! runtime.
//!
//! [`Orchestrator::run`] drives one agent through model calls, tool
//! execution, and handoffs until termination, bracketing the loop with
//! `RunStart`/`RunEnd` provider dispatch and consulting an optional
//! [`neuron_control::ControlHandle`] for pause/step/breakpoint control
//! at the top of every turn and after every lifecycle event.
//!
//! Nothing here is model-vendor-specific — [`Orchestrator`] is generic
//! over `C: neuron_turn::ModelClient`, never boxed.

pub mod convert;
pub mod orchestrator;

pub use orchestrator::{Orchestrator, OrchestratorConfig, RunInput};
