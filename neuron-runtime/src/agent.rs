//! Agents — named, immutable descriptions of a conversation participant.
//!
//! Agents are reference-equal by `name` within a run (§3): a handoff
//! names a target agent by string, and the orchestrator resolves it
//! against the run's `availableAgents` table by that name.

use std::fmt;
use std::sync::Arc;

use crate::context::ContextVariables;
use crate::provider_config::ProviderConfig;
use crate::tool::ToolDescriptor;

/// An agent's instructions: either a fixed string, or a pure producer
/// function of the current context variables.
///
/// A `Dynamic` producer runs once per turn (§4.1 step 3) and must not
/// mutate anything — it is a pure function from `contextVariables` to a
/// system-prompt string (spec §9 "Instruction producers").
#[derive(Clone)]
pub enum Instructions {
    /// A fixed system prompt.
    Static(String),
    /// A pure function of the run's context variables, called once per
    /// turn to materialise the system prompt.
    Dynamic(Arc<dyn Fn(&ContextVariables) -> String + Send + Sync>),
}

impl Instructions {
    /// Materialise the instruction string for the given context
    /// variables. For `Static`, this is a cheap clone; for `Dynamic`,
    /// this invokes the producer.
    pub fn materialize(&self, vars: &ContextVariables) -> String {
        match self {
            Instructions::Static(s) => s.clone(),
            Instructions::Dynamic(f) => f(vars),
        }
    }
}

impl fmt::Debug for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instructions::Static(s) => f.debug_tuple("Static").field(s).finish(),
            Instructions::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl From<&str> for Instructions {
    fn from(s: &str) -> Self {
        Instructions::Static(s.to_owned())
    }
}

impl From<String> for Instructions {
    fn from(s: String) -> Self {
        Instructions::Static(s)
    }
}

/// Which tools, if any, the model is required to call this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
    /// The model must not call any tool.
    None,
    /// The model must call some tool, any tool.
    Required,
    /// The model must call this specific named tool.
    Named(String),
}

impl Default for ToolChoice {
    fn default() -> Self {
        ToolChoice::Auto
    }
}

/// Whether an agent's tool calls within one assistant turn may execute
/// concurrently (§4.4 Parallelism).
pub type ParallelToolCalls = bool;

/// Immutable description of a conversation participant.
///
/// Agents are cheap to clone (an `Arc`-backed `Instructions::Dynamic`
/// closure aside, everything else is owned data) and are compared by
/// `name` for handoff resolution, not by structural equality.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Stable name. Handoffs and `availableAgents` lookups use this.
    pub name: String,
    /// Static instructions or a context-variable-driven producer.
    pub instructions: Instructions,
    /// Tools this agent may call, in declaration order.
    pub tools: Vec<ToolDescriptor>,
    /// Provider configurations materialised when this agent becomes
    /// current (§4.3).
    pub providers: Vec<ProviderConfig>,
    /// Tool-choice policy for this agent's model calls.
    pub tool_choice: ToolChoice,
    /// Whether this agent's tool calls may run concurrently.
    pub parallel_tool_calls: ParallelToolCalls,
}

impl Agent {
    /// Build an agent with static instructions and no tools or
    /// providers. Use the builder methods to add them.
    pub fn new(name: impl Into<String>, instructions: impl Into<Instructions>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            providers: Vec::new(),
            tool_choice: ToolChoice::Auto,
            parallel_tool_calls: false,
        }
    }

    /// Add a tool descriptor.
    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add a provider configuration.
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }

    /// Set the tool-choice policy.
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }

    /// Enable parallel tool-call execution for this agent.
    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }
}
