//! Conversions between the run-context's `neuron_runtime` vocabulary and
//! the `neuron_turn` model-client wire contract.
//!
//! `neuron-turn` intentionally knows nothing about `neuron-runtime`
//! (see its `ToolChoiceWire` doc comment); this module is where the two
//! meet, once per turn.

use neuron_runtime::{Message, MessageInfo, Role as RuntimeRole, ToolCall, ToolChoice, ToolDescriptor};
use neuron_turn::{ContentPart, ModelMessage, ModelResponse, Role as WireRole, ToolChoiceWire, ToolSchema};
use rust_decimal::prelude::ToPrimitive;

/// Translate an agent's tool-choice policy into the wire contract's
/// equivalent.
pub fn tool_choice_to_wire(choice: &ToolChoice) -> ToolChoiceWire {
    match choice {
        ToolChoice::Auto => ToolChoiceWire::Auto,
        ToolChoice::None => ToolChoiceWire::None,
        ToolChoice::Required => ToolChoiceWire::Required,
        ToolChoice::Named(name) => ToolChoiceWire::Named { name: name.clone() },
    }
}

/// Translate tool descriptors into the JSON-Schema-bearing wire shape
/// the model client sends to the backend.
pub fn build_tool_schemas(tools: &[ToolDescriptor]) -> Vec<ToolSchema> {
    tools
        .iter()
        .map(|t| ToolSchema {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: t.parameters.clone(),
        })
        .collect()
}

/// Translate the append-only runtime history into the model client's
/// message list.
///
/// An assistant message with tool calls becomes a `ToolUse` part per
/// call (plus a leading `Text` part if `content` is non-empty); a tool
/// result message becomes a `ToolResult` part carried on a `User`-role
/// message, the convention the wire contract's backends expect.
pub fn history_to_model_messages(history: &[Message]) -> Vec<ModelMessage> {
    history.iter().map(message_to_model_message).collect()
}

fn message_to_model_message(message: &Message) -> ModelMessage {
    match message.role {
        RuntimeRole::System => ModelMessage {
            role: WireRole::System,
            content: vec![ContentPart::Text {
                text: message.content.clone(),
            }],
        },
        RuntimeRole::User => ModelMessage {
            role: WireRole::User,
            content: vec![ContentPart::Text {
                text: message.content.clone(),
            }],
        },
        RuntimeRole::Assistant => {
            let mut parts = Vec::new();
            if !message.content.is_empty() {
                parts.push(ContentPart::Text {
                    text: message.content.clone(),
                });
            }
            for call in message.tool_calls.iter().flatten() {
                parts.push(ContentPart::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: serde_json::from_str(&call.arguments)
                        .unwrap_or_else(|_| serde_json::json!({ "input": call.arguments })),
                });
            }
            ModelMessage {
                role: WireRole::Assistant,
                content: parts,
            }
        }
        RuntimeRole::Tool => ModelMessage {
            role: WireRole::User,
            content: vec![ContentPart::ToolResult {
                tool_use_id: message.tool_call_id.clone().unwrap_or_default(),
                content: message.content.clone(),
                is_error: false,
            }],
        },
    }
}

/// Translate a model client's response into the assistant message the
/// orchestrator appends to history (§4.1 step 6).
pub fn model_response_to_message(response: &ModelResponse) -> Message {
    let mut text = String::new();
    let mut calls = Vec::new();
    for part in &response.content {
        match part {
            ContentPart::Text { text: t } => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(t);
            }
            ContentPart::ToolUse { id, name, input } => {
                calls.push(ToolCall::new(
                    id.clone(),
                    name.clone(),
                    serde_json::to_string(input).unwrap_or_default(),
                ));
            }
            ContentPart::ToolResult { .. } | ContentPart::Image { .. } => {}
        }
    }

    let mut message = if calls.is_empty() {
        Message::assistant(text)
    } else {
        Message::assistant_with_tool_calls(text, calls)
    };

    message.info = Some(MessageInfo {
        tokens: Some(response.usage.input_tokens + response.usage.output_tokens),
        cost: response.cost.and_then(|d| d.to_f64()),
        model: Some(response.model.clone()),
    });

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuron_turn::{StopReason, TokenUsage};
    use serde_json::json;

    #[test]
    fn tool_choice_named_translates() {
        let wire = tool_choice_to_wire(&ToolChoice::Named("bash".into()));
        assert_eq!(wire, ToolChoiceWire::Named { name: "bash".into() });
    }

    #[test]
    fn tool_descriptor_becomes_schema() {
        let tools = vec![ToolDescriptor::new("add", "adds", json!({"type": "object"}))];
        let schemas = build_tool_schemas(&tools);
        assert_eq!(schemas[0].name, "add");
    }

    #[test]
    fn user_message_becomes_text_part() {
        let history = vec![Message::user("hi")];
        let messages = history_to_model_messages(&history);
        assert_eq!(messages[0].role, WireRole::User);
        assert_eq!(
            messages[0].content,
            vec![ContentPart::Text { text: "hi".into() }]
        );
    }

    #[test]
    fn assistant_tool_call_becomes_tool_use_part() {
        let history = vec![Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("tc_1", "add", r#"{"a":1,"b":2}"#)],
        )];
        let messages = history_to_model_messages(&history);
        assert_eq!(messages[0].role, WireRole::Assistant);
        match &messages[0].content[0] {
            ContentPart::ToolUse { id, name, input } => {
                assert_eq!(id, "tc_1");
                assert_eq!(name, "add");
                assert_eq!(input, &json!({"a": 1, "b": 2}));
            }
            other => panic!("expected ToolUse, got {other:?}"),
        }
    }

    #[test]
    fn tool_message_becomes_tool_result_on_user_role() {
        let history = vec![Message::tool("tc_1", "5")];
        let messages = history_to_model_messages(&history);
        assert_eq!(messages[0].role, WireRole::User);
        match &messages[0].content[0] {
            ContentPart::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                assert_eq!(tool_use_id, "tc_1");
                assert_eq!(content, "5");
                assert!(!is_error);
            }
            other => panic!("expected ToolResult, got {other:?}"),
        }
    }

    #[test]
    fn response_with_text_and_tool_use_splits_correctly() {
        let response = ModelResponse {
            content: vec![
                ContentPart::Text {
                    text: "let me check".into(),
                },
                ContentPart::ToolUse {
                    id: "tc_1".into(),
                    name: "add".into(),
                    input: json!({"a": 1}),
                },
            ],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
                cache_read_tokens: None,
                cache_creation_tokens: None,
            },
            model: "test-model".into(),
            cost: None,
            truncated: None,
        };
        let message = model_response_to_message(&response);
        assert_eq!(message.content, "let me check");
        assert!(message.has_tool_calls());
        assert_eq!(message.info.unwrap().tokens, Some(15));
    }
}
