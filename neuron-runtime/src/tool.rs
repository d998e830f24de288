//! Tool descriptors — the schema half of a tool.
//!
//! A [`ToolDescriptor`] is pure data: name, description, and a JSON
//! Schema for its parameters. It is what an [`crate::agent::Agent`]
//! lists and what gets serialised to the model's native function-calling
//! format (§3 Tool descriptor). The *implementation* — the callable that
//! actually runs when the model asks for this tool by name — is not
//! carried on the descriptor; it is resolved by name against a
//! `neuron_tool::ToolRegistry` at invocation time. Keeping the two
//! separate is what lets `neuron-runtime` sit below `neuron-tool` in the
//! dependency graph instead of the two crates depending on each other.

use serde::{Deserialize, Serialize};

/// Name, description, and parameter schema for a tool available to an
/// agent. Serialised to the model in its native function-calling format
/// by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// The tool's unique name, as the model will refer to it.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    ///
    /// Must not declare the reserved `contextVariables` parameter name
    /// (§6): that name is stripped before serialisation and re-injected
    /// before invocation.
    pub parameters: serde_json::Value,
}

impl ToolDescriptor {
    /// Build a tool descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
