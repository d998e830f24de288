//! Outbound control-plane wire messages (§4.5, §6).
//!
//! Everything here flows *from* the runtime to whatever is watching a
//! run — a debugger UI, a log sink, a chat frontend. Framing (the
//! line-delimited JSON envelope, the socket it travels over) is left to
//! the caller; this module only types the payloads.

use serde::{Deserialize, Serialize};

/// One entry in the telemetry trace: a named span bracketing a turn,
/// model call, or tool call.
///
/// `name` follows the convention fixed by §6: the event kind
/// (`"turn_start"`, `"handoff"`, ...) or `"model.complete"` /
/// `"tool.<name>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Unique identifier for this span.
    pub id: String,
    /// The enclosing span's id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Span name (event kind or `model.complete` / `tool.<name>`).
    pub name: String,
    /// When the span opened.
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// When the span closed, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Free-form span attributes (agent name, tool name, token counts, ...).
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl Span {
    /// Open a span with no end time and no attributes yet.
    pub fn open(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            start_time: chrono::Utc::now(),
            end_time: None,
            attributes: serde_json::Value::Null,
        }
    }

    /// Set the parent span id.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Attach free-form attributes.
    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// Close the span now.
    pub fn close(mut self) -> Self {
        self.end_time = Some(chrono::Utc::now());
        self
    }
}

/// A chunk of streamed model output on a named channel.
///
/// Streamed chunks are for display only — they never enter conversation
/// history directly (§9 "Streaming vs history"); the aggregated message
/// from [`neuron_turn`]'s `ModelClient::complete` is what gets appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Logical channel this chunk belongs to (e.g. the current agent's name).
    pub channel: String,
    /// The text fragment.
    pub text: String,
}

/// Whether the run is currently waiting on a `UserInput` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStatus {
    /// True while the loop is blocked waiting for a `UserInput` message.
    pub awaiting_user_input: bool,
}

/// Whether the run is currently halted at the pause gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakStatus {
    /// True while [`crate::gate::PauseGate::gate`] is blocked.
    pub paused: bool,
}

/// Tagged union of every outbound message kind, for line-delimited JSON
/// framing (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A telemetry span opening or closing.
    Span(Span),
    /// A fragment of streamed model output.
    StreamChunk(StreamChunk),
    /// Whether the run awaits user input.
    ChatStatus(ChatStatus),
    /// Whether the run is paused.
    BreakStatus(BreakStatus),
}
