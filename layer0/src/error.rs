//! The run error taxonomy.
//!
//! Only [`RunError::Config`] aborts a `run` call before the loop starts.
//! Every other variant is materialised as a [`crate::content::Content`]
//! inside a tool or assistant message and flows through history — callers
//! never see a bare `Err` for a model hiccup, an unknown tool, or a bad
//! handoff target.

use thiserror::Error;

/// Errors that can surface while driving a run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RunError {
    /// Malformed agent or provider configuration. Fatal: returned from
    /// `run()` before the loop starts, never produced mid-loop.
    #[error("config error: {0}")]
    Config(String),

    /// The model adapter failed or returned an unparseable message.
    /// Surfaced as an assistant message with error content; forces
    /// termination for the turn.
    #[error("model error: {0}")]
    Model(String),

    /// A tool name on a call did not resolve against the current agent's
    /// tools. Surfaced as a tool message; the run continues.
    #[error("tool not found: {0}")]
    ToolResolve(String),

    /// A tool raised during execution. Captured into a tool message; the
    /// run continues.
    #[error("tool execution failed: {0}")]
    ToolExec(String),

    /// A tool result named an agent that does not exist. Surfaced as a
    /// tool message; no agent change occurs.
    #[error("handoff target not found: {0}")]
    Handoff(String),

    /// A budget provider reported spend above its configured ceiling.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// The control-plane channel failed. Logged, never terminates the run.
    #[error("control plane error: {0}")]
    ControlPlane(String),

    /// Catch-all for forward compatibility.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RunError {
    /// Whether this error, by the taxonomy's propagation rule, must abort
    /// `run()` rather than be folded into history as a message.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RunError::Config(_))
    }
}
