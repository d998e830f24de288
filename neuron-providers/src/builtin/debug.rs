//! Debug/telemetry provider — logs every lifecycle dispatch.
//!
//! Subscribes to all nine event kinds. This is the in-process producer
//! of the telemetry layer an external span store (out of scope, §1)
//! eventually persists: `neuron-orchestrator` is what actually emits
//! `neuron_control::Span`s per turn/event-dispatch/model-call/tool-call
//! (§6); this provider is the illustrative handler exercising the
//! subscribe-to-everything pattern, recording a local trail via
//! `tracing` for anything watching the process's own logs.

use async_trait::async_trait;
use tracing::debug;

use crate::event::{Event, EventKind};
use crate::patch::ContextPatch;
use crate::provider::{Provider, ProviderError};

const SUBSCRIBED: &[EventKind] = &EventKind::ALL;

/// Logs every dispatch it sees; never patches the run.
pub struct DebugProvider {
    label: String,
}

impl DebugProvider {
    /// Build a debug provider, tagging its log lines with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

#[async_trait]
impl Provider for DebugProvider {
    fn subscribed_events(&self) -> &[EventKind] {
        SUBSCRIBED
    }

    async fn handle(&self, event: &Event<'_>) -> Result<Option<ContextPatch>, ProviderError> {
        debug!(
            label = %self.label,
            kind = %event.kind,
            turn = event.context.turn,
            agent = %event.context.current_agent,
            timestamp = %event.timestamp,
            "lifecycle event"
        );
        Ok(None)
    }
}
