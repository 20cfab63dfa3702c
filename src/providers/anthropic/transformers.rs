//! Transformers for the Anthropic Messages API

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::LlmError;
use crate::transformers::{request::RequestTransformer, response::ResponseTransformer};
use crate::types::{
    ChatCompletionResponse, ChatMessage, ChatRequest, FinishReason, MessageRole, Tool, ToolCall,
    Usage,
};

/// Anthropic rejects requests without `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Convert messages to Anthropic format.
///
/// System messages are hoisted into the top-level `system` string. Tool
/// results become `tool_result` blocks; consecutive results share one user
/// turn so roles keep alternating.
pub fn convert_messages(messages: &[ChatMessage]) -> (Vec<Value>, Option<String>) {
    let mut system_parts = Vec::new();
    let mut out: Vec<Value> = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => system_parts.push(msg.text().to_string()),
            MessageRole::User => out.push(json!({
                "role": "user",
                "content": [{ "type": "text", "text": msg.text() }],
            })),
            MessageRole::Assistant => {
                let mut blocks = Vec::new();
                if !msg.text().is_empty() {
                    blocks.push(json!({ "type": "text", "text": msg.text() }));
                }
                blocks.extend(msg.tool_calls().iter().map(tool_use_block));
                if blocks.is_empty() {
                    tracing::debug!("Skipping empty assistant message");
                    continue;
                }
                out.push(json!({ "role": "assistant", "content": blocks }));
            }
            MessageRole::Tool => {
                let block = json!({
                    "type": "tool_result",
                    "tool_use_id": msg.tool_call_id.as_deref().unwrap_or_default(),
                    "content": msg.text(),
                });
                match out.last_mut() {
                    Some(last) if is_tool_result_turn(last) => {
                        if let Some(blocks) = last["content"].as_array_mut() {
                            blocks.push(block);
                        }
                    }
                    _ => out.push(json!({ "role": "user", "content": [block] })),
                }
            }
        }
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (out, system)
}

fn tool_use_block(call: &ToolCall) -> Value {
    // `input` must be an object even when the model produced malformed JSON
    let input = call
        .parsed_arguments()
        .ok()
        .filter(Value::is_object)
        .unwrap_or_else(|| json!({}));
    json!({
        "type": "tool_use",
        "id": call.id,
        "name": call.function.name,
        "input": input,
    })
}

fn is_tool_result_turn(message: &Value) -> bool {
    message["role"] == "user"
        && message["content"].as_array().is_some_and(|blocks| {
            blocks
                .iter()
                .all(|b| b["type"].as_str() == Some("tool_result"))
        })
}

/// Tools in Anthropic's `input_schema` shape.
pub fn convert_tools(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "name": t.function.name,
                "description": t.function.description,
                "input_schema": t.function.parameters,
            })
        })
        .collect()
}

pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason {
        Some("end_turn") | Some("stop_sequence") => Some(FinishReason::Stop),
        Some("max_tokens") => Some(FinishReason::Length),
        Some("tool_use") => Some(FinishReason::ToolCalls),
        Some("refusal") => Some(FinishReason::ContentFilter),
        Some(other) => Some(FinishReason::Other(other.to_string())),
        None => None,
    }
}

/// Request transformer for Anthropic
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicRequestTransformer;

impl RequestTransformer for AnthropicRequestTransformer {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<Value, LlmError> {
        if req.model.trim().is_empty() {
            return Err(LlmError::InvalidParameter(
                "Model must be specified".to_string(),
            ));
        }

        let (messages, system) = convert_messages(&req.messages);
        let p = &req.params;
        let mut body = json!({
            "model": req.model,
            "messages": messages,
            "max_tokens": p.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if let Some(t) = p.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(tp) = p.top_p {
            body["top_p"] = json!(tp);
        }
        if let Some(k) = p.top_k {
            body["top_k"] = json!(k);
        }
        if let Some(stop) = &p.stop {
            body["stop_sequences"] = json!(stop);
        }
        if p.seed.is_some() {
            tracing::debug!("Anthropic has no seed parameter; ignoring it");
        }
        if let Some(tools) = &req.tools {
            body["tools"] = json!(convert_tools(tools));
        }

        req.merge_extra_into(&mut body);
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicChatResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Response transformer for Anthropic
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicResponseTransformer;

impl ResponseTransformer for AnthropicResponseTransformer {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn transform_chat_response(&self, raw: &Value) -> Result<ChatCompletionResponse, LlmError> {
        let response: AnthropicChatResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid Anthropic response: {e}")))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                AnthropicContentBlock::Text { text: t } => text.push_str(&t),
                AnthropicContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::function(id, name, input.to_string()));
                }
                AnthropicContentBlock::Unknown => {}
            }
        }

        let message = if tool_calls.is_empty() {
            ChatMessage::assistant(text)
        } else {
            ChatMessage::assistant_tool_calls((!text.is_empty()).then_some(text), tool_calls)
        };
        let usage = response
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens));

        Ok(ChatCompletionResponse::from_message(
            message,
            parse_finish_reason(response.stop_reason.as_deref()),
        )
        .with_id(response.id)
        .with_model(response.model)
        .with_usage(usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommonParams;

    #[test]
    fn hoists_system_and_groups_tool_results() {
        let messages = vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("Weather in Tokyo and Paris?"),
            ChatMessage::assistant_tool_calls(
                None,
                vec![
                    ToolCall::function("toolu_1", "get_weather", r#"{"location":"Tokyo"}"#),
                    ToolCall::function("toolu_2", "get_weather", r#"{"location":"Paris"}"#),
                ],
            ),
            ChatMessage::tool("sunny", "toolu_1").with_name("get_weather"),
            ChatMessage::tool("rainy", "toolu_2").with_name("get_weather"),
        ];

        let (out, system) = convert_messages(&messages);
        assert_eq!(system.as_deref(), Some("Be brief."));
        assert_eq!(out.len(), 3);
        assert_eq!(out[1]["content"][0]["type"], "tool_use");
        assert_eq!(out[1]["content"][0]["input"]["location"], "Tokyo");
        assert_eq!(out[2]["role"], "user");
        assert_eq!(out[2]["content"].as_array().map(Vec::len), Some(2));
        assert_eq!(out[2]["content"][1]["tool_use_id"], "toolu_2");
        assert_eq!(out[2]["content"][1]["content"], "rainy");
    }

    #[test]
    fn drops_empty_assistant_turns() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant(""),
            ChatMessage::user("still there?"),
        ];
        let (out, _) = convert_messages(&messages);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|m| m["role"] == "user"));
        assert!(
            out.iter()
                .all(|m| m["content"].as_array().is_some_and(|c| !c.is_empty()))
        );
    }

    #[test]
    fn maps_params_and_tools() {
        let req = ChatRequest::new("claude-3-5-sonnet-latest", vec![ChatMessage::user("hi")])
            .with_params(CommonParams {
                temperature: Some(0.2),
                top_k: Some(5),
                stop: Some(vec!["END".into()]),
                ..Default::default()
            })
            .with_tools(vec![Tool::function(
                "get_weather",
                "Current weather",
                json!({"type": "object", "properties": {}}),
            )]);

        let body = AnthropicRequestTransformer.transform_chat(&req).unwrap();
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["top_k"], 5);
        assert_eq!(body["stop_sequences"], json!(["END"]));
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn parses_tool_use_response() {
        let raw = json!({
            "id": "msg_1",
            "model": "claude-3-5-sonnet-latest",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_weather", "input": {"location": "Tokyo"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        let resp = AnthropicResponseTransformer
            .transform_chat_response(&raw)
            .unwrap();
        assert_eq!(resp.finish_reason(), Some(&FinishReason::ToolCalls));
        assert_eq!(resp.content_text(), Some("Let me check."));
        assert_eq!(resp.tool_calls()[0].function.name, "get_weather");
        assert_eq!(
            resp.tool_calls()[0].parsed_arguments().unwrap(),
            json!({"location": "Tokyo"})
        );
        assert_eq!(resp.usage, Some(Usage::new(10, 5)));
    }

    #[test]
    fn unknown_blocks_are_skipped() {
        let raw = json!({
            "content": [{"type": "thinking", "thinking": "..."}, {"type": "text", "text": "Hi"}],
            "stop_reason": "end_turn"
        });
        let resp = AnthropicResponseTransformer
            .transform_chat_response(&raw)
            .unwrap();
        assert_eq!(resp.content_text(), Some("Hi"));
        assert_eq!(resp.finish_reason(), Some(&FinishReason::Stop));
    }
}
