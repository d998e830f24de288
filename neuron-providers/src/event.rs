//! Lifecycle event kinds and the event envelope (§4.3).
//!
//! The nine event kinds are exhaustive: every lifecycle moment the
//! orchestrator reaches fires exactly one of these, in the order fixed
//! by §4.1. Each [`Event`] carries a shared reference to the run's
//! [`RunContext`] (never owned, never mutated by a handler directly —
//! see [`crate::patch::ContextPatch`]) and an ISO-8601 timestamp.

use chrono::{DateTime, Utc};
use neuron_runtime::RunContext;

/// One of the nine lifecycle moments a provider may subscribe to (§4.3).
///
/// Ordering within a run follows §4.1: `RunStart` once before the first
/// turn, then `TurnStart`, `Instruct`, `MessageCompletion`,
/// `PostMessageCompletion`, optionally `ToolExecution`/
/// `PostToolExecution`, optionally `Handoff`, repeating per turn, and
/// finally `RunEnd` once after the loop exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Once, before the first turn. One-time setup per provider instance.
    RunStart,
    /// Start of each turn. Counters, pause checks.
    TurnStart,
    /// After instructions materialised. Memory providers inject recalled
    /// facts.
    Instruct,
    /// Just before calling the model. Last-chance prompt mutation.
    MessageCompletion,
    /// After the assistant message is appended. Budget, cost logging.
    PostMessageCompletion,
    /// Before the tool batch runs. Argument inspection.
    ToolExecution,
    /// After the tool batch completes. Side-effect logging.
    PostToolExecution,
    /// After an agent swap. State transfer between providers.
    Handoff,
    /// Once, after the loop exits. Flush.
    RunEnd,
}

impl EventKind {
    /// All nine kinds, in the order §4.1 first visits them within one
    /// turn (`RunStart`/`RunEnd` bracket the loop rather than recurring).
    pub const ALL: [EventKind; 9] = [
        EventKind::RunStart,
        EventKind::TurnStart,
        EventKind::Instruct,
        EventKind::MessageCompletion,
        EventKind::PostMessageCompletion,
        EventKind::ToolExecution,
        EventKind::PostToolExecution,
        EventKind::Handoff,
        EventKind::RunEnd,
    ];

    /// The wire/log identifier for this event kind, also used as the
    /// telemetry span name (§6: "Names are the event kind or
    /// `model.complete` / `tool.<name>`").
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::RunStart => "run_start",
            EventKind::TurnStart => "turn_start",
            EventKind::Instruct => "instruct",
            EventKind::MessageCompletion => "message_completion",
            EventKind::PostMessageCompletion => "post_message_completion",
            EventKind::ToolExecution => "tool_execution",
            EventKind::PostToolExecution => "post_tool_execution",
            EventKind::Handoff => "handoff",
            EventKind::RunEnd => "run_end",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched lifecycle event: a kind, a shared reference to the
/// current run-context, and the moment it fired.
///
/// Providers read `context` through the reference (§5: "providers
/// observe it through the run-context reference but must not mutate
/// it") and hand back a [`crate::patch::ContextPatch`] instead of
/// writing directly.
pub struct Event<'a> {
    /// Which lifecycle moment this is.
    pub kind: EventKind,
    /// The run-context as of this dispatch. Stable for the turn's
    /// duration (§4.2).
    pub context: &'a RunContext,
    /// When this event was dispatched.
    pub timestamp: DateTime<Utc>,
}

impl<'a> Event<'a> {
    /// Build an event firing now.
    pub fn new(kind: EventKind, context: &'a RunContext) -> Self {
        Self {
            kind,
            context,
            timestamp: Utc::now(),
        }
    }
}
