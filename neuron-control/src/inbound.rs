//! Inbound control-plane wire messages (§4.5, §6).
//!
//! Everything here flows *into* the runtime from whatever is driving a
//! debugging session. [`crate::handle::ControlHandle::apply_inbound`] is
//! the single place one of these takes effect.

use serde::{Deserialize, Serialize};

/// Pause or resume the run. Idempotent: sending the same value twice has
/// no additional effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPaused {
    /// The desired paused state.
    pub paused: bool,
}

/// Allow `n` additional turns to proceed while paused. Additive: a
/// second `SetStep` before the budget is exhausted adds to it rather
/// than replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStep {
    /// Number of turns to allow through the gate.
    pub n: u64,
}

/// Force a pause the next time the named lifecycle event fires.
/// Idempotent: setting the same breakpoint twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBreakpoint {
    /// The event name to break on, matching
    /// `neuron_providers::EventKind::as_str()`.
    pub event: String,
}

/// Text supplied by the user in response to `ChatStatus.awaiting_user_input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// The user-supplied text.
    pub text: String,
}

/// Tagged union of every inbound message kind, for line-delimited JSON
/// framing (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Pause or resume the run.
    SetPaused(SetPaused),
    /// Allow `n` more turns while paused.
    SetStep(SetStep),
    /// Break on a named lifecycle event.
    SetBreakpoint(SetBreakpoint),
    /// User-supplied text.
    UserInput(UserInput),
}
