//! Run-context — the mutable record threaded through one `run` call (§3, §4.2).
//!
//! Exactly one [`RunContext`] exists per `run` call. It is passed by
//! shared reference to every event and every provider handler; handlers
//! never get a `&mut RunContext` (see [`crate::context::ContextVariables`]
//! docs) — they return a context patch instead, which only the
//! orchestrator applies. That is what makes "providers mutate the
//! context" safe despite events being dispatched through shared
//! references: the mutation point is singular and orchestrator-owned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::message::Message;
use crate::provider_config::ProviderConfig;
use crate::tool::ToolDescriptor;

/// String-keyed map of opaque context values.
///
/// Providers and tool results patch this freely; patches merge left to
/// right, later values overriding earlier ones for the same key (§4.3
/// "Patches are merged in dispatch order").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextVariables(HashMap<String, serde_json::Value>);

impl ContextVariables {
    /// An empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Look up a variable and coerce it to `&str`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Insert or overwrite a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    /// Merge `other` into `self`, with `other`'s values winning on key
    /// collision. This is the fold operation used both for provider
    /// context patches (§4.3) and tool-result variable merges (§4.4).
    pub fn merge(&mut self, other: &ContextVariables) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Number of variables currently set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variables are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all key/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// Why the orchestrator stopped running turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The run has not yet terminated (in-progress sentinel).
    None,
    /// `turn` reached `maxTurns` (§4.1 step 11).
    MaxTurns,
    /// The assistant message carried no tool calls, or `executeTools`
    /// was false (§4.1 step 7).
    NoToolCalls,
    /// A provider or budget policy explicitly requested termination
    /// (§4.3 `terminate` patch field, §7 `BudgetExceeded` with effect
    /// `error`).
    Explicit,
    /// The run-level timeout tripped (§5 Cancellation and timeouts).
    Cancelled,
}

impl Default for TerminationReason {
    fn default() -> Self {
        TerminationReason::None
    }
}

/// The mutable record threaded through a single `run` call.
///
/// `current_agent`/`previous_agent` are agent *names* (§3: "Agents are
/// reference-equal by `name` within a run"), resolved against
/// `available_agents` when an `Agent` value is needed.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Non-negative, strictly-increasing turn counter (§3 invariant 2).
    pub turn: u64,
    /// Turn budget; the loop stops once `turn >= max_turns`.
    pub max_turns: u64,
    /// Name of the agent currently driving the conversation.
    pub current_agent: String,
    /// Name of the agent that was current before the most recent
    /// handoff, if any.
    pub previous_agent: Option<String>,
    /// Ordered, append-only message history. The `system` message is
    /// never stored here (§3 invariant 1).
    pub message_history: Vec<Message>,
    /// String-keyed map of opaque values, mutated via patches.
    pub context_variables: ContextVariables,
    /// All agents reachable by handoff in this run, keyed by name.
    pub available_agents: HashMap<String, Agent>,
    /// Tool descriptors available to the current agent this turn.
    pub available_tools: Vec<ToolDescriptor>,
    /// Snapshot of the provider configurations active for the current
    /// agent, rebuilt lazily when new providers appear (§4.2).
    pub available_providers: Vec<ProviderConfig>,
    /// The most recent assistant message appended to history, if any.
    pub last_assistant_message: Option<Message>,
    /// Why the run stopped, or `None` while still running.
    pub termination_reason: TerminationReason,
}

impl RunContext {
    /// Build a fresh run-context for a run starting on `start_agent`.
    pub fn new(start_agent: impl Into<String>, max_turns: u64) -> Self {
        Self {
            turn: 0,
            max_turns,
            current_agent: start_agent.into(),
            previous_agent: None,
            message_history: Vec::new(),
            context_variables: ContextVariables::new(),
            available_agents: HashMap::new(),
            available_tools: Vec::new(),
            available_providers: Vec::new(),
            last_assistant_message: None,
            termination_reason: TerminationReason::None,
        }
    }

    /// Read-only view of the message history, the only way providers
    /// observe it (§5 "Shared resources": "providers observe it through
    /// the run-context reference but must not mutate it").
    pub fn history(&self) -> &[Message] {
        &self.message_history
    }
}

/// The outcome of a `run` call (§4.1 entry point).
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The suffix of `messageHistory` produced during this call (i.e.
    /// not including any messages the caller passed in as history).
    pub messages: Vec<Message>,
    /// The agent current when the loop exited.
    pub current_agent: String,
    /// The final context variables.
    pub context_variables: ContextVariables,
    /// Why the loop stopped.
    pub termination_reason: TerminationReason,
    /// Number of turns completed.
    pub turns_used: u64,
}
