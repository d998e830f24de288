//! Messages — the append-only record of a run.
//!
//! Invariant 1 (spec §3): within one run, every non-system message has a
//! monotonically non-decreasing creation index; the `system` message is
//! always index 0 and never stored in [`crate::context::RunContext::message_history`].
//! That invariant is enforced by construction — the orchestrator only
//! ever pushes onto the history vector, never inserts or reorders it.

use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions. Never stored in history (§3 invariant 1).
    System,
    /// Input from the human or calling application.
    User,
    /// Output from the model.
    Assistant,
    /// The result of executing a tool call.
    Tool,
}

/// A single tool-call directive emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier the model assigned this call. Echoed back on the
    /// matching tool-role message.
    pub id: String,
    /// Name of the tool the model wants invoked.
    pub name: String,
    /// Raw, unparsed argument string as emitted by the model.
    pub arguments: String,
}

impl ToolCall {
    /// Build a tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Token/cost/model bookkeeping attached to an assistant message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    /// Total tokens consumed producing this message, if known.
    pub tokens: Option<u64>,
    /// Cost of producing this message, if the model client reports one.
    pub cost: Option<f64>,
    /// The concrete model identifier that produced this message.
    pub model: Option<String>,
}

/// A single message in a run's history.
///
/// Messages are append-only: once constructed and pushed onto
/// [`crate::context::RunContext::message_history`], a message is never
/// mutated (§3 Lifecycles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this message.
    pub role: Role,
    /// Text content. May be empty, e.g. a pure tool-call assistant message.
    pub content: String,
    /// Tool calls the model requested, if `role == Assistant`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// The tool-call id this message answers, if `role == Tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Token/cost/model bookkeeping, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<MessageInfo>,
}

impl Message {
    /// Build a plain user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            info: None,
        }
    }

    /// Build an assistant message with no tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            info: None,
        }
    }

    /// Build an assistant message carrying tool calls.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            info: None,
        }
    }

    /// Build a tool-result message answering `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            info: None,
        }
    }

    /// Whether this assistant message carries any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        matches!(&self.tool_calls, Some(calls) if !calls.is_empty())
    }
}
