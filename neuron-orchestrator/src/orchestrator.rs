//! The turn loop (C6, §4.1): the eleven-step cycle that drives one
//! `run` call from a starting agent to termination.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use layer0::RunError;
use neuron_providers::{ContextPatch, EventKind, ProviderManager};
use neuron_runtime::{
    Agent, ContextVariables, Message, RunContext, RunResult, TerminationReason,
};
use neuron_tool::{invoke_batch, ToolRegistry};
use neuron_turn::{ModelClient, ModelRequest, StopReason};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use neuron_control::{ControlHandle, SpanGuard};

use crate::convert::{build_tool_schemas, history_to_model_messages, model_response_to_message, tool_choice_to_wire};

/// Tunables shared across every `run` call an [`Orchestrator`] drives.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Default max output tokens per model call, unless an agent's
    /// request overrides it.
    pub default_max_tokens: Option<u32>,
    /// Default sampling temperature.
    pub default_temperature: Option<f64>,
    /// Default model identifier passed to the model client.
    pub default_model: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: Some(4096),
            default_temperature: None,
            default_model: None,
        }
    }
}

/// Everything one `run` call needs: the agent table, the starting agent,
/// seed context, and optional run-level limits (§4.1, §5).
pub struct RunInput {
    /// Name of the agent the run starts on. Must be a key of `agents`.
    pub start_agent: String,
    /// Every agent reachable by handoff in this run.
    pub agents: HashMap<String, Agent>,
    /// Seed context variables.
    pub context_variables: ContextVariables,
    /// Prior message history to seed the run with (e.g. resuming a
    /// conversation). New messages are appended after this.
    pub history: Vec<Message>,
    /// Turn budget; the loop stops once `turn >= max_turns`.
    pub max_turns: u64,
    /// Run-level wall-clock deadline, checked at the top of each turn.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation, checked alongside `timeout`.
    pub cancellation: Option<CancellationToken>,
}

impl RunInput {
    /// A run starting fresh on `start_agent` with no seed history.
    pub fn new(start_agent: impl Into<String>, agents: HashMap<String, Agent>, max_turns: u64) -> Self {
        Self {
            start_agent: start_agent.into(),
            agents,
            context_variables: ContextVariables::new(),
            history: Vec::new(),
            max_turns,
            timeout: None,
            cancellation: None,
        }
    }
}

/// Drives the turn loop against a concrete model client.
///
/// Generic over `C: ModelClient` rather than boxed — `ModelClient` uses
/// RPITIT and is not object-safe by design (see `neuron-turn`'s doc
/// comment on the trait).
pub struct Orchestrator<C: ModelClient> {
    model_client: C,
    tools: ToolRegistry,
    providers: ProviderManager,
    control: Option<ControlHandle>,
    config: OrchestratorConfig,
}

impl<C: ModelClient> Orchestrator<C> {
    /// Assemble an orchestrator from its dependencies.
    pub fn new(
        model_client: C,
        tools: ToolRegistry,
        providers: ProviderManager,
        control: Option<ControlHandle>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            model_client,
            tools,
            providers,
            control,
            config,
        }
    }

    /// Block on the pause/step/breakpoint checkpoint, publishing
    /// `BreakStatus{true}` the moment this call actually has to wait and
    /// `BreakStatus{false}` (the gate's post-release state) once it is
    /// released (§4.5 "When paused, the orchestrator publishes
    /// `BreakStatus{true}` and waits ... any inbound `SetPaused{false}`
    /// wakes it").
    async fn gate(&self, event_name: &str) {
        if let Some(control) = &self.control {
            control
                .gate
                .gate_with(
                    event_name,
                    || control.emit_break_status(),
                    || control.emit_break_status(),
                )
                .await;
        }
    }

    /// Dispatch one lifecycle event to its subscribed providers, gate
    /// on it, and bracket the whole thing in a span named after the
    /// event kind (§6 "Emitted for: ... each event dispatch").
    async fn dispatch(&self, kind: EventKind, ctx: &RunContext, parent_span_id: Option<&str>) -> ContextPatch {
        let _span = SpanGuard::open(self.control.as_ref(), kind.as_str(), parent_span_id, serde_json::Value::Null);
        let patch = self
            .providers
            .dispatch(kind, &ctx.current_agent, &ctx.available_providers, ctx)
            .await;
        self.gate(kind.as_str()).await;
        patch
    }

    fn apply_patch(&self, ctx: &mut RunContext, patch: ContextPatch, pending_handoff: &mut Option<String>) {
        if let Some(vars) = patch.context_variables {
            ctx.context_variables.merge(&vars);
        }
        if patch.next_agent.is_some() {
            *pending_handoff = patch.next_agent;
        }
        if patch.terminate {
            ctx.termination_reason = TerminationReason::Explicit;
        }
    }

    /// Load `agent_name`'s tools/providers onto `ctx`, materialising any
    /// provider instances it needs for the first time and firing
    /// `RunStart` to exactly those new instances (§4.3).
    async fn enter_agent(&self, ctx: &mut RunContext, agent_name: &str, parent_span_id: Option<&str>) -> Result<(), RunError> {
        let agent = ctx
            .available_agents
            .get(agent_name)
            .ok_or_else(|| RunError::Config(format!("unknown agent: {agent_name}")))?
            .clone();

        let materialized = self
            .providers
            .ensure_agent_providers(agent_name, &agent.providers)
            .map_err(|e| RunError::Config(e.to_string()))?;

        ctx.current_agent = agent_name.to_string();
        ctx.available_tools = agent.tools.clone();
        ctx.available_providers = agent.providers.clone();

        if !materialized.new_instances.is_empty() {
            let _span = SpanGuard::open(
                self.control.as_ref(),
                EventKind::RunStart.as_str(),
                parent_span_id,
                serde_json::json!({"agent": agent_name}),
            );
            self.providers
                .fire_to_instances(EventKind::RunStart, &materialized.new_instances, ctx)
                .await;
        }
        Ok(())
    }

    fn current_agent(&self, ctx: &RunContext) -> Agent {
        ctx.available_agents
            .get(&ctx.current_agent)
            .cloned()
            .expect("current_agent always resolves; enter_agent validated it")
    }

    fn past_deadline(&self, started: Instant, input: &RunInput) -> bool {
        if let Some(token) = &input.cancellation {
            if token.is_cancelled() {
                return true;
            }
        }
        if let Some(timeout) = input.timeout {
            if started.elapsed() >= timeout {
                return true;
            }
        }
        false
    }

    /// Run the turn loop to completion (§4.1).
    ///
    /// Returns `Err` only for `RunError::Config` — anything raised
    /// mid-loop (a model error, an unresolved tool, a bad handoff
    /// target) is folded into history as a message and the loop
    /// continues (§7).
    pub async fn run(&self, input: RunInput) -> Result<RunResult, RunError> {
        let started = Instant::now();
        let baseline_len = input.history.len();

        if !input.agents.contains_key(&input.start_agent) {
            return Err(RunError::Config(format!(
                "unknown start agent: {}",
                input.start_agent
            )));
        }

        let mut ctx = RunContext::new(&input.start_agent, input.max_turns);
        ctx.available_agents = input.agents;
        ctx.context_variables = input.context_variables;
        ctx.message_history = input.history;

        self.enter_agent(&mut ctx, &input.start_agent, None).await?;

        loop {
            if self.past_deadline(started, &input) {
                ctx.termination_reason = TerminationReason::Cancelled;
                break;
            }

            // One span per turn (§6); dropped at every exit from this
            // loop body — early `break`, handoff failure, or falling
            // through to the next iteration — so its close event always
            // lands regardless of which path a turn takes.
            let turn_span = SpanGuard::open(
                self.control.as_ref(),
                "turn",
                None,
                serde_json::json!({"turn": ctx.turn}),
            );
            let parent = turn_span.id();

            self.gate("turn_start").await;

            // Bracket the drain in `ChatStatus` so the UI can tell the
            // runtime is (briefly) checking for queued input before
            // proceeding with the turn (§4.5 `ChatStatus{awaitingUserInput}`).
            if let Some(control) = &self.control {
                control.emit_chat_status(true);
                while let Some(text) = control.take_user_input() {
                    ctx.message_history.push(Message::user(text));
                }
                control.emit_chat_status(false);
            }

            let mut pending_handoff: Option<String> = None;

            // Every path through this block represents one turn having
            // been processed, including early termination (no tool
            // calls, an explicit provider `terminate` patch, a failed
            // handoff materialisation): `ctx.turn` is incremented exactly
            // once after the block regardless of which `break 'turn` was
            // taken, matching the original's `current_turn += 1` after
            // every `_process_turn` call (§8 S1/S2: a single no-tool turn
            // counts as `turn = 1`, not `0`).
            'turn: {
                let patch = self.dispatch(EventKind::TurnStart, &ctx, parent).await;
                self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                if ctx.termination_reason != TerminationReason::None {
                    break 'turn;
                }

                let agent = self.current_agent(&ctx);
                let system = agent.instructions.materialize(&ctx.context_variables);

                let patch = self.dispatch(EventKind::Instruct, &ctx, parent).await;
                self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                if ctx.termination_reason != TerminationReason::None {
                    break 'turn;
                }

                let patch = self.dispatch(EventKind::MessageCompletion, &ctx, parent).await;
                self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                if ctx.termination_reason != TerminationReason::None {
                    break 'turn;
                }

                let request = ModelRequest {
                    model: input_model_for(&self.config, &agent),
                    messages: history_to_model_messages(&ctx.message_history),
                    tools: build_tool_schemas(&ctx.available_tools),
                    tool_choice: tool_choice_to_wire(&agent.tool_choice),
                    parallel_tool_calls: agent.parallel_tool_calls,
                    max_tokens: self.config.default_max_tokens,
                    temperature: self.config.default_temperature,
                    system: Some(system),
                    extra: serde_json::Value::Null,
                };

                let model_span = SpanGuard::open(
                    self.control.as_ref(),
                    "model.complete",
                    parent,
                    serde_json::json!({"model": request.model.clone()}),
                );
                let completion = self.model_client.complete(request).await;
                drop(model_span);

                let assistant_message = match completion {
                    Ok(response) => {
                        let mut message = model_response_to_message(&response);
                        match response.stop_reason {
                            StopReason::MaxTokens => {
                                let err = RunError::Model("output truncated (max_tokens)".into());
                                warn!(error = %err, "model stopped on max_tokens");
                                message = Message::assistant(format!("error: {err}"));
                            }
                            StopReason::ContentFilter => {
                                let err = RunError::Model("content filtered".into());
                                warn!(error = %err, "model response filtered");
                                message = Message::assistant(format!("error: {err}"));
                            }
                            StopReason::EndTurn | StopReason::ToolUse => {}
                        }
                        message
                    }
                    Err(e) => {
                        let err = RunError::Model(e.to_string());
                        warn!(error = %err, "model client call failed");
                        Message::assistant(format!("error: {err}"))
                    }
                };

                ctx.message_history.push(assistant_message.clone());
                ctx.last_assistant_message = Some(assistant_message.clone());

                let patch = self.dispatch(EventKind::PostMessageCompletion, &ctx, parent).await;
                self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                if ctx.termination_reason != TerminationReason::None {
                    break 'turn;
                }

                if !assistant_message.has_tool_calls() {
                    ctx.termination_reason = TerminationReason::NoToolCalls;
                    break 'turn;
                }

                let patch = self.dispatch(EventKind::ToolExecution, &ctx, parent).await;
                self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                if ctx.termination_reason != TerminationReason::None {
                    break 'turn;
                }

                let calls = assistant_message.tool_calls.clone().unwrap_or_default();
                let batch = invoke_batch(
                    &self.tools,
                    &calls,
                    &ctx.context_variables,
                    agent.parallel_tool_calls,
                    self.control.as_ref(),
                    parent,
                )
                .await;
                ctx.message_history.extend(batch.messages);
                ctx.context_variables.merge(&batch.context_variables);
                if batch.handoff.is_some() {
                    pending_handoff = batch.handoff;
                }

                let patch = self.dispatch(EventKind::PostToolExecution, &ctx, parent).await;
                self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                if ctx.termination_reason != TerminationReason::None {
                    break 'turn;
                }

                if let Some(target) = pending_handoff {
                    if ctx.available_agents.contains_key(&target) {
                        ctx.previous_agent = Some(ctx.current_agent.clone());
                        if let Err(e) = self.enter_agent(&mut ctx, &target, parent).await {
                            warn!(error = %e, "failed to materialise providers for handoff target");
                            ctx.termination_reason = TerminationReason::Explicit;
                            break 'turn;
                        }
                        let patch = self.dispatch(EventKind::Handoff, &ctx, parent).await;
                        self.apply_patch(&mut ctx, patch, &mut pending_handoff);
                    } else {
                        let err = RunError::Handoff(target);
                        warn!(error = %err, "handoff target not found; agent unchanged");
                        ctx.message_history
                            .push(Message::assistant(format!("error: {err}")));
                    }
                }
            }

            ctx.turn += 1;
            debug!(turn = ctx.turn, agent = %ctx.current_agent, "turn complete");
            if ctx.termination_reason != TerminationReason::None {
                break;
            }
            if ctx.turn >= ctx.max_turns {
                ctx.termination_reason = TerminationReason::MaxTurns;
                break;
            }
        }

        self.dispatch(EventKind::RunEnd, &ctx, None).await;

        Ok(RunResult {
            messages: ctx.message_history[baseline_len..].to_vec(),
            current_agent: ctx.current_agent,
            context_variables: ctx.context_variables,
            termination_reason: ctx.termination_reason,
            turns_used: ctx.turn,
        })
    }
}

fn input_model_for(config: &OrchestratorConfig, _agent: &Agent) -> Option<String> {
    config.default_model.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use neuron_providers::{Event, Provider, ProviderError, ProviderFactory};
    use neuron_runtime::{Instructions, Scope as ProviderScope, ToolChoice, ToolDescriptor};
    use neuron_tool::{ToolDyn, ToolError};
    use neuron_turn::{ContentPart, ModelClientError, ModelResponse, TokenUsage};
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    struct MockModelClient {
        responses: StdMutex<std::collections::VecDeque<ModelResponse>>,
    }

    impl MockModelClient {
        fn new(responses: Vec<ModelResponse>) -> Self {
            Self {
                responses: StdMutex::new(responses.into_iter().collect()),
            }
        }
    }

    impl ModelClient for MockModelClient {
        async fn complete(&self, _request: ModelRequest) -> Result<ModelResponse, ModelClientError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ModelClientError::InvalidResponse("no more mock responses".into()))
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

    fn tool_use(id: &str, name: &str, input: serde_json::Value) -> ModelResponse {
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

    struct EchoTool;
    impl ToolDyn for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes input"
        }
        fn input_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: serde_json::Value,
            _cv: &ContextVariables,
        ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>> {
            Box::pin(async move { Ok(input) })
        }
    }

    struct TransferTool;
    impl ToolDyn for TransferTool {
        fn name(&self) -> &str {
            "transfer"
        }
        fn description(&self) -> &str {
            "hands off to another agent"
        }
        fn input_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: serde_json::Value,
            _cv: &ContextVariables,
        ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>> {
            Box::pin(async move {
                let to = input.get("to").and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!({"value": "ok", "agent": to}))
            })
        }
    }

    fn router_agent() -> Agent {
        Agent::new("router", Instructions::Static("be helpful".into()))
            .with_tool(ToolDescriptor::new("echo", "echoes", json!({"type": "object"})))
    }

    fn agent_table(agents: Vec<Agent>) -> HashMap<String, Agent> {
        agents.into_iter().map(|a| (a.name.clone(), a)).collect()
    }

    fn orchestrator(
        responses: Vec<ModelResponse>,
        tools: ToolRegistry,
        providers: ProviderManager,
    ) -> Orchestrator<MockModelClient> {
        Orchestrator::new(
            MockModelClient::new(responses),
            tools,
            providers,
            None,
            OrchestratorConfig::default(),
        )
    }

    #[tokio::test]
    async fn single_turn_ends_on_no_tool_calls_s1() {
        let orch = orchestrator(vec![end_turn("hi there")], ToolRegistry::new(), ProviderManager::new());
        let input = RunInput::new("router", agent_table(vec![router_agent()]), 10);

        let result = orch.run(input).await.unwrap();

        assert_eq!(result.termination_reason, TerminationReason::NoToolCalls);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "hi there");
        assert_eq!(result.turns_used, 1);
    }

    #[tokio::test]
    async fn tool_call_then_end_turn_s2() {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(EchoTool));

        let responses = vec![
            tool_use("tc_1", "echo", json!({"msg": "hi"})),
            end_turn("done"),
        ];
        let orch = orchestrator(responses, tools, ProviderManager::new());
        let input = RunInput::new("router", agent_table(vec![router_agent()]), 10);

        let result = orch.run(input).await.unwrap();

        assert_eq!(result.termination_reason, TerminationReason::NoToolCalls);
        // assistant (tool call) + tool result + assistant (end turn)
        assert_eq!(result.messages.len(), 3);
        assert_eq!(result.messages[1].role, neuron_runtime::Role::Tool);
        assert_eq!(result.messages[1].content, "{\"msg\":\"hi\"}");
        assert_eq!(result.turns_used, 2);
    }

    #[tokio::test]
    async fn handoff_switches_current_agent_s3() {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(TransferTool));

        let router = Agent::new("router", "route requests")
            .with_tool(ToolDescriptor::new("transfer", "hands off", json!({"type": "object"})));
        let worker = Agent::new("worker", "do the work");

        let responses = vec![
            tool_use("tc_1", "transfer", json!({"to": "worker"})),
            end_turn("handled"),
        ];
        let orch = orchestrator(responses, tools, ProviderManager::new());
        let input = RunInput::new("router", agent_table(vec![router, worker]), 10);

        let result = orch.run(input).await.unwrap();

        assert_eq!(result.current_agent, "worker");
        assert_eq!(result.termination_reason, TerminationReason::NoToolCalls);
    }

    #[tokio::test]
    async fn unknown_tool_produces_error_message_and_continues_s5() {
        let responses = vec![
            tool_use("tc_1", "does_not_exist", json!({})),
            end_turn("recovered"),
        ];
        let orch = orchestrator(responses, ToolRegistry::new(), ProviderManager::new());
        let input = RunInput::new("router", agent_table(vec![router_agent()]), 10);

        let result = orch.run(input).await.unwrap();

        assert!(result.messages[1].content.contains("not found"));
        assert_eq!(result.termination_reason, TerminationReason::NoToolCalls);
    }

    #[tokio::test]
    async fn max_turns_terminates_with_reason_p2() {
        // Every response requests the same tool call, so the loop only
        // ever stops via the turn budget.
        let responses = vec![
            tool_use("tc_1", "echo", json!({})),
            tool_use("tc_2", "echo", json!({})),
            tool_use("tc_3", "echo", json!({})),
        ];
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(EchoTool));
        let orch = orchestrator(responses, tools, ProviderManager::new());
        let input = RunInput::new("router", agent_table(vec![router_agent()]), 3);

        let result = orch.run(input).await.unwrap();

        assert_eq!(result.termination_reason, TerminationReason::MaxTurns);
        assert_eq!(result.turns_used, 3);
    }

    struct CountingProvider {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        fn subscribed_events(&self) -> &[EventKind] {
            &[EventKind::RunStart]
        }
        async fn handle(&self, _event: &Event<'_>) -> Result<Option<ContextPatch>, ProviderError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn run_start_fires_once_for_a_fresh_global_provider_p1() {
        let count = Arc::new(AtomicUsize::new(0));
        let providers = ProviderManager::new();
        let for_factory = count.clone();
        providers.register_factory(
            "counter",
            Arc::new(move |_: &neuron_runtime::ProviderConfig| -> Result<Arc<dyn Provider>, ProviderError> {
                Ok(Arc::new(CountingProvider {
                    count: for_factory.clone(),
                }))
            }) as Arc<dyn ProviderFactory>,
        );

        let router = router_agent().with_provider(neuron_runtime::ProviderConfig::new(
            "counter",
            ProviderScope::Global,
        ));
        let orch = orchestrator(vec![end_turn("hi")], ToolRegistry::new(), providers);
        let input = RunInput::new("router", agent_table(vec![router]), 10);

        orch.run(input).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn context_variables_persist_across_turns_p3() {
        let mut tools = ToolRegistry::new();
        struct SetVarTool;
        impl ToolDyn for SetVarTool {
            fn name(&self) -> &str {
                "set_var"
            }
            fn description(&self) -> &str {
                "sets a context variable"
            }
            fn input_schema(&self) -> serde_json::Value {
                json!({"type": "object"})
            }
            fn call(
                &self,
                _input: serde_json::Value,
                _cv: &ContextVariables,
            ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolError>> + Send + '_>>
            {
                Box::pin(async move { Ok(json!({"value": "ok", "contextVariables": {"seen": true}})) })
            }
        }
        tools.register(Arc::new(SetVarTool));

        let agent = Agent::new("router", "be helpful")
            .with_tool(ToolDescriptor::new("set_var", "sets a var", json!({"type": "object"})));
        let responses = vec![tool_use("tc_1", "set_var", json!({})), end_turn("done")];
        let orch = orchestrator(responses, tools, ProviderManager::new());
        let input = RunInput::new("router", agent_table(vec![agent]), 10);

        let result = orch.run(input).await.unwrap();

        assert_eq!(result.context_variables.get("seen"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn unknown_start_agent_is_a_config_error() {
        let orch = orchestrator(vec![], ToolRegistry::new(), ProviderManager::new());
        let input = RunInput::new("ghost", HashMap::new(), 10);

        let err = orch.run(input).await.unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[tokio::test]
    async fn queued_user_input_is_appended_to_history() {
        let (control, _outbound_rx) = ControlHandle::new();
        control.apply_inbound(neuron_control::InboundMessage::UserInput(
            neuron_control::UserInput {
                text: "actually, make it blue".into(),
            },
        ));

        let orch = Orchestrator::new(
            MockModelClient::new(vec![end_turn("ok, blue it is")]),
            ToolRegistry::new(),
            ProviderManager::new(),
            Some(control),
            OrchestratorConfig::default(),
        );
        let input = RunInput::new("router", agent_table(vec![router_agent()]), 10);

        let result = orch.run(input).await.unwrap();

        assert_eq!(result.messages[0].role, neuron_runtime::Role::User);
        assert_eq!(result.messages[0].content, "actually, make it blue");
        assert_eq!(result.messages[1].content, "ok, blue it is");
    }

    #[tokio::test]
    async fn pause_gate_publishes_break_status_while_blocked_s6() {
        let (control, mut outbound_rx) = ControlHandle::new();
        control.gate.set_paused(true);

        let orch = Arc::new(Orchestrator::new(
            MockModelClient::new(vec![end_turn("done")]),
            ToolRegistry::new(),
            ProviderManager::new(),
            Some(control),
            OrchestratorConfig::default(),
        ));
        let input = RunInput::new("router", agent_table(vec![router_agent()]), 10);

        let run_orch = orch.clone();
        let run_task = tokio::spawn(async move { run_orch.run(input).await });

        let mut saw_paused = false;
        for _ in 0..20 {
            match tokio::time::timeout(Duration::from_millis(50), outbound_rx.recv()).await {
                Ok(Some(neuron_control::OutboundMessage::BreakStatus(status))) if status.paused => {
                    saw_paused = true;
                    break;
                }
                Ok(Some(_)) => continue,
                _ => break,
            }
        }
        assert!(
            saw_paused,
            "expected BreakStatus{{paused: true}} while blocked at turn_start"
        );

        orch.control.as_ref().unwrap().gate.set_paused(false);

        let result = tokio::time::timeout(Duration::from_millis(500), run_task)
            .await
            .expect("run should finish after resume")
            .unwrap()
            .unwrap();

        assert_eq!(result.termination_reason, TerminationReason::NoToolCalls);
    }
}
