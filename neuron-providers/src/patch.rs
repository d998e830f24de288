//! Context patches — the only way a provider handler changes a run (§4.3).
//!
//! A handler never receives `&mut RunContext`; it returns an optional
//! [`ContextPatch`] instead, which the [`crate::manager::ProviderManager`]
//! folds across a dispatch and the orchestrator applies once, after every
//! handler for the event has run. This is what keeps "providers mutate
//! the context" safe under shared references (§4.2).

use neuron_runtime::ContextVariables;

/// A partial update to the run produced by one provider handler call.
///
/// Multiple patches from one event dispatch are merged in priority
/// (dispatch) order: `context_variables` folds left-to-right with later
/// values winning on key collision (same rule as tool-result variable
/// merges, §4.4); `next_agent` and `terminate` follow "last non-null
/// wins" for the same reason a handoff request becomes visible only at
/// the next handoff boundary, not mid-event (§4.3).
#[derive(Debug, Clone, Default)]
pub struct ContextPatch {
    /// Variables to merge into `contextVariables`.
    pub context_variables: Option<ContextVariables>,
    /// A handoff request. Takes effect at the next handoff boundary
    /// (§4.1 step 10), not mid-event.
    pub next_agent: Option<String>,
    /// Request that the run terminate (§7 `BudgetExceeded` with effect
    /// `error`; `terminationReason` becomes `explicit`).
    pub terminate: bool,
}

impl ContextPatch {
    /// An empty patch: no change.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A patch that only sets context variables.
    pub fn with_variables(vars: ContextVariables) -> Self {
        Self {
            context_variables: Some(vars),
            next_agent: None,
            terminate: false,
        }
    }

    /// A patch that only requests a handoff.
    pub fn with_handoff(agent: impl Into<String>) -> Self {
        Self {
            context_variables: None,
            next_agent: Some(agent.into()),
            terminate: false,
        }
    }

    /// A patch that only requests termination.
    pub fn terminate() -> Self {
        Self {
            context_variables: None,
            next_agent: None,
            terminate: true,
        }
    }

    /// Fold `other` into `self` as the later patch in dispatch order:
    /// `other`'s fields win wherever it sets them.
    pub fn merge(&mut self, other: ContextPatch) {
        match (&mut self.context_variables, other.context_variables) {
            (Some(existing), Some(incoming)) => existing.merge(&incoming),
            (slot @ None, Some(incoming)) => *slot = Some(incoming),
            _ => {}
        }
        if other.next_agent.is_some() {
            self.next_agent = other.next_agent;
        }
        self.terminate = self.terminate || other.terminate;
    }

    /// Whether this patch carries no change at all.
    pub fn is_empty(&self) -> bool {
        self.context_variables.is_none() && self.next_agent.is_none() && !self.terminate
    }
}
