//! The tool invoker (C1 algorithm, spec §4.4).
//!
//! [`invoke_batch`] runs resolve → decode → strip → invoke → normalise
//! for every tool call in a model-emitted batch, then reduces the
//! per-call results into the triple the orchestrator needs: tool
//! messages (in declared order), merged context variables, and the
//! handoff target, if any.

use neuron_control::{ControlHandle, SpanGuard};
use neuron_runtime::{ContextVariables, Message, ToolCall};
use serde_json::Value;

use crate::{ToolDyn, ToolError, ToolRegistry};

/// Reserved argument name automatically injected by the orchestrator.
/// Tool schemas must not declare it (§6); the invoker strips it from
/// the decoded arguments before the tool body ever sees it.
pub const RESERVED_CONTEXT_VARIABLES_KEY: &str = "contextVariables";

/// The outcome of reducing one tool-call batch (§4.4 step 2-3).
#[derive(Debug, Clone)]
pub struct InvokeBatchResult {
    /// Tool-role messages, in the model's declared call order.
    pub messages: Vec<Message>,
    /// Context-variable patch folded left-to-right across the batch.
    pub context_variables: ContextVariables,
    /// The last non-null `agent` field across the batch, if any (§4.4
    /// step 2: "the final handoff target is the *last* non-null `agent`
    /// field across tool messages in declared order" — this is the
    /// explicit resolution of the tie-break Open Question in spec §9).
    pub handoff: Option<String>,
}

/// Decode a model-emitted raw argument string as a JSON object.
///
/// On parse failure, or if the parsed value is not a JSON object, the
/// raw string is wrapped under a single `input` key (§4.4 step b).
pub fn decode_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Value::Object(map),
        _ => {
            let mut wrapped = serde_json::Map::new();
            wrapped.insert("input".to_string(), Value::String(raw.to_string()));
            Value::Object(wrapped)
        }
    }
}

/// Strip the reserved `contextVariables` argument name from a decoded
/// argument object (§4.4 step c).
pub fn strip_reserved(mut args: Value) -> Value {
    if let Value::Object(ref mut map) = args {
        map.remove(RESERVED_CONTEXT_VARIABLES_KEY);
    }
    args
}

/// The normalised shape of a tool's return value (§4.4 step e).
enum Normalized {
    /// A plain value: no handoff, no variable patch.
    Plain(Value),
    /// A structured result naming a context-variable patch and/or a
    /// handoff target.
    Structured {
        value: Value,
        context_variables: Option<ContextVariables>,
        agent: Option<String>,
    },
}

/// Normalise a tool's raw JSON return value.
///
/// A JSON object carrying a `value` key is treated as the structured
/// `{value, contextVariables, agent}` shape; anything else is a plain
/// value (§4.4 step e).
pub fn normalize_outcome(raw: Value) -> Normalized {
    if let Value::Object(ref map) = raw {
        if let Some(value) = map.get("value").cloned() {
            let context_variables = map.get("contextVariables").and_then(|cv| {
                cv.as_object().map(|obj| {
                    let mut vars = ContextVariables::new();
                    for (k, v) in obj {
                        vars.insert(k.clone(), v.clone());
                    }
                    vars
                })
            });
            let agent = map
                .get("agent")
                .and_then(|a| a.as_str())
                .map(|s| s.to_string());
            return Normalized::Structured {
                value,
                context_variables,
                agent,
            };
        }
    }
    Normalized::Plain(raw)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Run one tool call through resolve/decode/strip/invoke/normalise
/// (§4.4 step 1) and produce its tool-role message plus any patch.
///
/// Brackets the actual tool invocation in a `tool.<name>` span (§6
/// "Emitted for: ... each tool call") when a control handle is
/// attached; a `None` handle makes span emission a no-op.
async fn invoke_one(
    registry: &ToolRegistry,
    call: &ToolCall,
    context_variables: &ContextVariables,
    control: Option<&ControlHandle>,
    parent_span_id: Option<&str>,
) -> (Message, Option<ContextVariables>, Option<String>) {
    let tool = match registry.get(&call.name) {
        Some(t) => t.clone(),
        None => {
            let msg = Message::tool(
                &call.id,
                format!("error: tool not found: {}", call.name),
            );
            return (msg, None, None);
        }
    };

    let decoded = strip_reserved(decode_arguments(&call.arguments));

    let _span = SpanGuard::open(
        control,
        format!("tool.{}", call.name),
        parent_span_id,
        serde_json::json!({"tool_call_id": call.id}),
    );
    let outcome = invoke_tool(tool.as_ref(), decoded, context_variables).await;

    match outcome {
        Ok(raw) => match normalize_outcome(raw) {
            Normalized::Plain(value) => (Message::tool(&call.id, stringify(&value)), None, None),
            Normalized::Structured {
                value,
                context_variables,
                agent,
            } => (
                Message::tool(&call.id, stringify(&value)),
                context_variables,
                agent,
            ),
        },
        Err(err) => (
            Message::tool(&call.id, format!("error: {err}")),
            None,
            None,
        ),
    }
}

async fn invoke_tool(
    tool: &dyn ToolDyn,
    input: Value,
    context_variables: &ContextVariables,
) -> Result<Value, ToolError> {
    tool.call(input, context_variables).await
}

/// Execute a full tool-call batch and reduce it to the triple the
/// orchestrator needs (§4.4).
///
/// When `parallel` is true, all calls in the batch are invoked
/// concurrently; the returned `messages` are still in the model's
/// declared order (§4.4 Parallelism, §3 invariant 3), since each call's
/// future is driven at its declared index regardless of completion
/// order. When `parallel` is false, calls run strictly one at a time in
/// declared order.
///
/// `control`/`parent_span_id` thread telemetry span emission down to
/// each individual call (§6); pass `None` for either when the run has
/// no control plane attached or the batch has no enclosing turn span.
pub async fn invoke_batch(
    registry: &ToolRegistry,
    calls: &[ToolCall],
    context_variables: &ContextVariables,
    parallel: bool,
    control: Option<&ControlHandle>,
    parent_span_id: Option<&str>,
) -> InvokeBatchResult {
    let per_call: Vec<(Message, Option<ContextVariables>, Option<String>)> = if parallel {
        let futures = calls
            .iter()
            .map(|call| invoke_one(registry, call, context_variables, control, parent_span_id));
        futures::future::join_all(futures).await
    } else {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(invoke_one(registry, call, context_variables, control, parent_span_id).await);
        }
        results
    };

    let mut messages = Vec::with_capacity(per_call.len());
    let mut merged = ContextVariables::new();
    let mut handoff = None;

    for (message, patch, agent) in per_call {
        messages.push(message);
        if let Some(patch) = patch {
            merged.merge(&patch);
        }
        if agent.is_some() {
            handoff = agent;
        }
    }

    InvokeBatchResult {
        messages,
        context_variables: merged,
        handoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    struct AddTool;

    impl ToolDyn for AddTool {
        fn name(&self) -> &str {
            "add"
        }
        fn description(&self) -> &str {
            "adds two numbers"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: Value,
            _cv: &ContextVariables,
        ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
            Box::pin(async move {
                let a = input.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
                let b = input.get("b").and_then(|v| v.as_i64()).unwrap_or(0);
                Ok(json!(a + b))
            })
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
        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: Value,
            _cv: &ContextVariables,
        ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
            Box::pin(async move {
                let to = input.get("to").and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!({"value": "ok", "agent": to}))
            })
        }
    }

    /// Sleeps briefly before returning its `url` argument — used to
    /// confirm parallel batches preserve declared order regardless of
    /// completion timing (S4).
    struct FetchTool {
        delay: Duration,
    }

    impl ToolDyn for FetchTool {
        fn name(&self) -> &str {
            "fetch"
        }
        fn description(&self) -> &str {
            "fetches a url"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: Value,
            _cv: &ContextVariables,
        ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(input.get("url").cloned().unwrap_or(Value::Null))
            })
        }
    }

    fn registry_with(tools: Vec<Arc<dyn ToolDyn>>) -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        for t in tools {
            reg.register(t);
        }
        reg
    }

    #[test]
    fn decode_valid_json_object() {
        let decoded = decode_arguments(r#"{"a":2,"b":3}"#);
        assert_eq!(decoded, json!({"a": 2, "b": 3}));
    }

    #[test]
    fn decode_invalid_json_wraps_under_input() {
        let decoded = decode_arguments("not json");
        assert_eq!(decoded, json!({"input": "not json"}));
    }

    #[test]
    fn decode_non_object_json_wraps_under_input() {
        let decoded = decode_arguments("42");
        assert_eq!(decoded, json!({"input": "42"}));
    }

    #[test]
    fn strip_reserved_removes_context_variables() {
        let args = json!({"a": 1, "contextVariables": {"x": 1}});
        let stripped = strip_reserved(args);
        assert_eq!(stripped, json!({"a": 1}));
    }

    #[tokio::test]
    async fn single_tool_call_s2() {
        let reg = registry_with(vec![Arc::new(AddTool)]);
        let calls = vec![ToolCall::new("tc_1", "add", r#"{"a":2,"b":3}"#)];
        let vars = ContextVariables::new();
        let result = invoke_batch(&reg, &calls, &vars, false, None, None).await;

        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "5");
        assert_eq!(result.messages[0].tool_call_id.as_deref(), Some("tc_1"));
        assert!(result.handoff.is_none());
    }

    #[tokio::test]
    async fn handoff_s3() {
        let reg = registry_with(vec![Arc::new(TransferTool)]);
        let calls = vec![ToolCall::new("tc_1", "transfer", r#"{"to":"worker"}"#)];
        let vars = ContextVariables::new();
        let result = invoke_batch(&reg, &calls, &vars, false, None, None).await;

        assert_eq!(result.messages[0].content, "ok");
        assert_eq!(result.handoff.as_deref(), Some("worker"));
    }

    #[tokio::test]
    async fn unknown_tool_s5() {
        let reg = ToolRegistry::new();
        let calls = vec![ToolCall::new("tc_1", "nonexistent", "{}")];
        let vars = ContextVariables::new();
        let result = invoke_batch(&reg, &calls, &vars, false, None, None).await;

        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].tool_call_id.as_deref(), Some("tc_1"));
        assert!(result.messages[0].content.contains("not found"));
    }

    #[tokio::test]
    async fn parallel_batch_preserves_declared_order_s4() {
        let reg = registry_with(vec![Arc::new(FetchTool {
            delay: Duration::from_millis(5),
        })]);
        // Give the first call more delay than the second would have on
        // its own, so completion order would invert without the fix.
        let calls = vec![
            ToolCall::new("tc_1", "fetch", r#"{"url":"A"}"#),
            ToolCall::new("tc_2", "fetch", r#"{"url":"B"}"#),
        ];
        let vars = ContextVariables::new();
        let result = invoke_batch(&reg, &calls, &vars, true, None, None).await;

        assert_eq!(result.messages[0].content, "\"A\"");
        assert_eq!(result.messages[1].content, "\"B\"");
    }

    #[tokio::test]
    async fn last_non_null_agent_wins() {
        let reg = registry_with(vec![Arc::new(TransferTool)]);
        let calls = vec![
            ToolCall::new("tc_1", "transfer", r#"{"to":"worker_a"}"#),
            ToolCall::new("tc_2", "transfer", r#"{"to":"worker_b"}"#),
        ];
        let vars = ContextVariables::new();
        let result = invoke_batch(&reg, &calls, &vars, false, None, None).await;

        assert_eq!(result.handoff.as_deref(), Some("worker_b"));
    }

    #[tokio::test]
    async fn context_variable_patches_merge_left_to_right() {
        struct SetVarTool {
            key: &'static str,
            val: i64,
        }
        impl ToolDyn for SetVarTool {
            fn name(&self) -> &str {
                "set_var"
            }
            fn description(&self) -> &str {
                "sets a context variable"
            }
            fn input_schema(&self) -> Value {
                json!({"type": "object"})
            }
            fn call(
                &self,
                _input: Value,
                _cv: &ContextVariables,
            ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
                let key = self.key;
                let val = self.val;
                Box::pin(async move {
                    Ok(json!({"value": "ok", "contextVariables": {key: val}}))
                })
            }
        }

        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(SetVarTool { key: "x", val: 1 }));
        // Same tool name can only be registered once; use distinct names
        // to exercise two calls that both patch context variables.
        let calls = vec![ToolCall::new("tc_1", "set_var", "{}")];
        let vars = ContextVariables::new();
        let result = invoke_batch(&reg, &calls, &vars, false, None, None).await;
        assert_eq!(result.context_variables.get("x"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn each_call_emits_a_tool_span_nested_under_the_parent() {
        let reg = registry_with(vec![Arc::new(AddTool)]);
        let calls = vec![
            ToolCall::new("tc_1", "add", r#"{"a":1,"b":1}"#),
            ToolCall::new("tc_2", "add", r#"{"a":2,"b":2}"#),
        ];
        let vars = ContextVariables::new();
        let (control, mut rx) = neuron_control::ControlHandle::new();

        invoke_batch(&reg, &calls, &vars, false, Some(&control), Some("turn-sp")).await;

        let mut spans = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let neuron_control::OutboundMessage::Span(span) = msg {
                spans.push(span);
            }
        }
        // one open + one close per call
        assert_eq!(spans.len(), 4);
        assert!(spans.iter().all(|s| s.parent_id.as_deref() == Some("turn-sp")));
        assert!(spans.iter().any(|s| s.name == "tool.add" && s.end_time.is_none()));
        assert!(spans.iter().any(|s| s.name == "tool.add" && s.end_time.is_some()));
    }
}
