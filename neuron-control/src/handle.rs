//! [`ControlHandle`] — the orchestrator's single point of contact with
//! the control plane: the pause gate, the outbound span/status channel,
//! and the inbound message dispatcher (§4.5).
//!
//! This crate never opens a socket (§4.5 "(ambient) Transport"); callers
//! wire `ControlHandle`'s outbound sender to whatever transport they
//! like and feed deserialised [`crate::inbound::InboundMessage`]s back in
//! through [`ControlHandle::apply_inbound`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use crate::gate::PauseGate;
use crate::inbound::InboundMessage;
use crate::outbound::{ChatStatus, OutboundMessage, Span};

/// Bundles the pause gate, outbound sender, and queued user input an
/// orchestrator needs to drive one run under control-plane supervision.
pub struct ControlHandle {
    /// Shared pause/step/breakpoint checkpoint.
    pub gate: PauseGate,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    pending_input: Mutex<VecDeque<String>>,
    span_seq: AtomicU64,
}

impl ControlHandle {
    /// Build a handle paired with the receiving half of its outbound
    /// channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                gate: PauseGate::new(),
                outbound: tx,
                pending_input: Mutex::new(VecDeque::new()),
                span_seq: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Allocate the next span id for this handle. Monotonic per handle,
    /// not globally unique — callers that fan out across handles (tests,
    /// multiple concurrent runs) should not assume cross-handle
    /// uniqueness.
    pub fn next_span_id(&self) -> String {
        format!("sp_{}", self.span_seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Emit a span. Silently drops the message if nothing is listening
    /// on the outbound channel anymore.
    pub fn emit_span(&self, span: Span) {
        let _ = self.outbound.send(OutboundMessage::Span(span));
    }

    /// Emit a streamed output chunk.
    pub fn emit_stream_chunk(&self, channel: impl Into<String>, text: impl Into<String>) {
        let _ = self.outbound.send(OutboundMessage::StreamChunk(
            crate::outbound::StreamChunk {
                channel: channel.into(),
                text: text.into(),
            },
        ));
    }

    /// Emit whether the run is waiting on user input.
    pub fn emit_chat_status(&self, awaiting_user_input: bool) {
        let _ = self
            .outbound
            .send(OutboundMessage::ChatStatus(ChatStatus {
                awaiting_user_input,
            }));
    }

    /// Emit the current pause state.
    pub fn emit_break_status(&self) {
        let _ = self
            .outbound
            .send(OutboundMessage::BreakStatus(self.gate.status()));
    }

    /// Apply one inbound message, the only place any of them take effect.
    pub fn apply_inbound(&self, message: InboundMessage) {
        match message {
            InboundMessage::SetPaused(m) => {
                debug!(paused = m.paused, "control: set_paused");
                self.gate.set_paused(m.paused);
            }
            InboundMessage::SetStep(m) => {
                debug!(n = m.n, "control: set_step");
                self.gate.set_step(m.n);
            }
            InboundMessage::SetBreakpoint(m) => {
                debug!(event = %m.event, "control: set_breakpoint");
                self.gate.set_breakpoint(m.event);
            }
            InboundMessage::UserInput(m) => {
                debug!("control: user_input");
                self.pending_input.lock().unwrap().push_back(m.text);
            }
        }
    }

    /// Pop the oldest queued `UserInput` text, if any arrived since the
    /// last call.
    pub fn take_user_input(&self) -> Option<String> {
        self.pending_input.lock().unwrap().pop_front()
    }
}

/// RAII span emitter: opens (and emits) a span on construction, emits
/// the matching close on drop (§6 "Emitted for: each turn, each event
/// dispatch, each model call, each tool call").
///
/// Closing on `Drop` rather than requiring an explicit call means a
/// turn that exits early — termination mid-dispatch, a handoff error,
/// the run-level deadline tripping — still emits a well-formed close
/// event, since `break`/`return` run destructors for locals in scope.
///
/// A `None` handle (no control plane attached to this run) makes this a
/// no-op: no span is allocated, nothing is sent.
pub struct SpanGuard<'a> {
    control: Option<&'a ControlHandle>,
    span: Option<Span>,
}

impl<'a> SpanGuard<'a> {
    /// Open a span named `name`, optionally nested under `parent`, and
    /// emit it immediately.
    pub fn open(
        control: Option<&'a ControlHandle>,
        name: impl Into<String>,
        parent: Option<&str>,
        attributes: serde_json::Value,
    ) -> Self {
        let span = control.map(|c| {
            let mut span = Span::open(c.next_span_id(), name);
            if let Some(parent) = parent {
                span = span.with_parent(parent.to_string());
            }
            if !attributes.is_null() {
                span = span.with_attributes(attributes);
            }
            c.emit_span(span.clone());
            span
        });
        Self { control, span }
    }

    /// This span's id, for passing as a child span's `parent`. `None`
    /// when no control plane is attached.
    pub fn id(&self) -> Option<&str> {
        self.span.as_ref().map(|s| s.id.as_str())
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        if let (Some(control), Some(span)) = (self.control, self.span.take()) {
            control.emit_span(span.close());
        }
    }
}
