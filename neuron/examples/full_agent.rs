//! End-to-end run through [`Orchestrator`] with a deterministic model
//! client and a calculator tool — the same shape a real backend-backed
//! run takes, minus the network call.
//!
//! Run with:
//!
//! ```sh
//! cargo run --example full_agent -p neuron --features orchestrator
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use neuron::prelude::*;
use neuron_turn::{ContentPart, ModelClientError, ModelResponse, Role as WireRole, StopReason, TokenUsage};
use serde_json::json;

/// Runs the calculator tool once, then ends the turn with a final answer.
struct ScriptedModelClient;

impl ModelClient for ScriptedModelClient {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ModelClientError> {
        let already_called_tool = request
            .messages
            .iter()
            .any(|m| m.role == WireRole::Assistant);

        let response = if already_called_tool {
            ModelResponse {
                content: vec![ContentPart::Text {
                    text: "42 * 17 is 714.".into(),
                }],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
                model: "scripted".into(),
                cost: None,
                truncated: None,
            }
        } else {
            ModelResponse {
                content: vec![ContentPart::ToolUse {
                    id: "tc_1".into(),
                    name: "calculate".into(),
                    input: json!({"expression": "42 * 17"}),
                }],
                stop_reason: StopReason::ToolUse,
                usage: TokenUsage::default(),
                model: "scripted".into(),
                cost: None,
                truncated: None,
            }
        };
        Ok(response)
    }
}

struct CalculateTool;

impl ToolDyn for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate a simple math expression. Supports +, -, *, /."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": { "expression": { "type": "string" } },
            "required": ["expression"],
        })
    }

    fn call(
        &self,
        input: serde_json::Value,
        _context_variables: &ContextVariables,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let expression = input
                .get("expression")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing expression".into()))?;
            let result = eval_simple(expression)
                .ok_or_else(|| ToolError::ExecutionFailed(format!("cannot evaluate: {expression}")))?;
            Ok(json!({ "result": result }))
        })
    }
}

fn eval_simple(expr: &str) -> Option<f64> {
    for op in [" + ", " - ", " * ", " / "] {
        if let Some((left, right)) = expr.split_once(op) {
            let a: f64 = left.trim().parse().ok()?;
            let b: f64 = right.trim().parse().ok()?;
            return Some(match op.trim() {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" => a / b,
                _ => return None,
            });
        }
    }
    expr.trim().parse().ok()
}

#[tokio::main]
async fn main() {
    let assistant = Agent::new(
        "assistant",
        "You are a helpful math assistant. Use the calculate tool for arithmetic.",
    )
    .with_tool(ToolDescriptor::new(
        "calculate",
        "Evaluate a simple math expression.",
        json!({"type": "object", "properties": {"expression": {"type": "string"}}}),
    ));

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CalculateTool));

    let orchestrator = Orchestrator::new(
        ScriptedModelClient,
        tools,
        ProviderManager::new(),
        None,
        OrchestratorConfig::default(),
    );

    let mut agents = HashMap::new();
    agents.insert("assistant".to_string(), assistant);
    let input = RunInput::new("assistant", agents, 5);

    let result = orchestrator.run(input).await.expect("run should succeed");

    for message in &result.messages {
        println!("{:?}: {}", message.role, message.content);
    }
    println!("terminated: {:?}", result.termination_reason);
}
