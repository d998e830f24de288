//! Integration tests exercising the `neuron` facade end to end: an
//! orchestrator run driven entirely through `neuron::prelude` types,
//! against a mock model client and a tool registry with middleware-free
//! and handoff-carrying tools.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use neuron::prelude::*;
use neuron_turn::{ContentPart, ModelClientError, ModelResponse, StopReason, TokenUsage};
use serde_json::json;

struct ScriptedModelClient {
    responses: Mutex<std::collections::VecDeque<ModelResponse>>,
}

impl ScriptedModelClient {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

impl ModelClient for ScriptedModelClient {
    async fn complete(&self, _request: ModelRequest) -> Result<ModelResponse, ModelClientError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelClientError::InvalidResponse("script exhausted".into()))
    }
}

fn end_turn(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![ContentPart::Text { text: text.into() }],
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
        model: "mock".into(),
        cost: None,
        truncated: None,
    }
}

fn tool_call(id: &str, name: &str, input: serde_json::Value) -> ModelResponse {
    ModelResponse {
        content: vec![ContentPart::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage::default(),
        model: "mock".into(),
        cost: None,
        truncated: None,
    }
}

struct EchoTool {
    calls: Arc<AtomicUsize>,
}

impl ToolDyn for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "echoes its input"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({"type": "object"})
    }
    fn call(
        &self,
        input: serde_json::Value,
        _cv: &ContextVariables,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(input) })
    }
}

fn router_agent() -> Agent {
    Agent::new("router", "you may echo or hand off")
        .with_tool(ToolDescriptor::new("echo", "echoes", json!({"type": "object"})))
}

fn single_agent_table(agent: Agent) -> HashMap<String, Agent> {
    let mut table = HashMap::new();
    table.insert(agent.name.clone(), agent);
    table
}

#[tokio::test]
async fn minimal_run_ends_on_text_response() {
    let orchestrator = Orchestrator::new(
        ScriptedModelClient::new(vec![end_turn("Paris")]),
        ToolRegistry::new(),
        ProviderManager::new(),
        None,
        OrchestratorConfig::default(),
    );
    let input = RunInput::new("router", single_agent_table(router_agent()), 10);

    let result = orchestrator.run(input).await.unwrap();

    assert_eq!(result.messages[0].content, "Paris");
    assert_eq!(result.termination_reason, TerminationReason::NoToolCalls);
    assert_eq!(result.turns_used, 1);
}

#[tokio::test]
async fn run_with_tool_call_then_final_answer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool {
        calls: calls.clone(),
    }));

    let orchestrator = Orchestrator::new(
        ScriptedModelClient::new(vec![
            tool_call("tc_1", "echo", json!({"text": "hello"})),
            end_turn("I echoed: hello"),
        ]),
        tools,
        ProviderManager::new(),
        None,
        OrchestratorConfig::default(),
    );
    let input = RunInput::new("router", single_agent_table(router_agent()), 10);

    let result = orchestrator.run(input).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.messages.last().unwrap().content, "I echoed: hello");
    assert_eq!(result.turns_used, 2);
}

#[tokio::test]
async fn run_stops_at_max_turns() {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool {
        calls: Arc::new(AtomicUsize::new(0)),
    }));

    let orchestrator = Orchestrator::new(
        ScriptedModelClient::new(vec![
            tool_call("tc_1", "echo", json!({"n": 1})),
            tool_call("tc_2", "echo", json!({"n": 2})),
        ]),
        tools,
        ProviderManager::new(),
        None,
        OrchestratorConfig::default(),
    );
    let input = RunInput::new("router", single_agent_table(router_agent()), 2);

    let result = orchestrator.run(input).await.unwrap();

    assert_eq!(result.termination_reason, TerminationReason::MaxTurns);
    assert_eq!(result.turns_used, 2);
}
