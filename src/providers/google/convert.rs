//! Gemini conversion helpers (pure functions)
//!
//! Map the normalized request onto `generateContent` and back. No HTTP here.

use serde_json::{Value, json};

use super::schema::to_openapi_schema;
use super::types::{
    Candidate, Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiTool,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::error::LlmError;
use crate::transformers::{request::RequestTransformer, response::ResponseTransformer};
use crate::types::{
    ChatCompletionResponse, ChatMessage, ChatRequest, Choice, FinishReason, MessageRole, Tool,
    ToolCall, Usage,
};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_TOP_K: u32 = 40;

/// Name of the function a tool result answers: the message's own `name`,
/// else the name of the assistant call with the same id.
fn function_name_for(message: &ChatMessage, history: &[ChatMessage]) -> Result<String, LlmError> {
    if let Some(name) = &message.name {
        return Ok(name.clone());
    }
    let id = message.tool_call_id.as_deref().unwrap_or_default();
    history
        .iter()
        .flat_map(|m| m.tool_calls())
        .find(|c| c.id == id)
        .map(|c| c.function.name.clone())
        .ok_or_else(|| {
            LlmError::InvalidParameter(format!(
                "Tool result '{id}' has no function name and matches no earlier tool call"
            ))
        })
}

/// Gemini wants an object; plain-text results are wrapped.
fn function_response_payload(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => v,
        Ok(other) => json!({ "content": other }),
        Err(_) => json!({ "content": text }),
    }
}

/// Convert messages into `(contents, systemInstruction)`.
pub fn convert_messages(
    messages: &[ChatMessage],
) -> Result<(Vec<Content>, Option<Content>), LlmError> {
    let mut system_parts = Vec::new();
    let mut contents: Vec<Content> = Vec::new();

    for (i, msg) in messages.iter().enumerate() {
        match msg.role {
            MessageRole::System => system_parts.push(Part::Text {
                text: msg.text().to_string(),
            }),
            MessageRole::User => contents.push(Content {
                role: Some("user".into()),
                parts: vec![Part::Text {
                    text: msg.text().to_string(),
                }],
            }),
            MessageRole::Assistant => {
                let mut parts = Vec::new();
                if !msg.text().is_empty() {
                    parts.push(Part::Text {
                        text: msg.text().to_string(),
                    });
                }
                for call in msg.tool_calls() {
                    parts.push(Part::FunctionCall {
                        function_call: FunctionCall {
                            name: call.function.name.clone(),
                            args: call.parsed_arguments().unwrap_or_else(|_| json!({})),
                        },
                    });
                }
                contents.push(Content {
                    role: Some("model".into()),
                    parts,
                });
            }
            MessageRole::Tool => {
                let part = Part::FunctionResponse {
                    function_response: FunctionResponse {
                        name: function_name_for(msg, &messages[..i])?,
                        response: function_response_payload(msg.text()),
                    },
                };
                // consecutive results answer one model turn
                match contents.last_mut() {
                    Some(last) if is_function_response_turn(last) => last.parts.push(part),
                    _ => contents.push(Content {
                        role: Some("user".into()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    let system = (!system_parts.is_empty()).then(|| Content {
        role: None,
        parts: system_parts,
    });
    Ok((contents, system))
}

fn is_function_response_turn(content: &Content) -> bool {
    content.role.as_deref() == Some("user")
        && !content.parts.is_empty()
        && content
            .parts
            .iter()
            .all(|p| matches!(p, Part::FunctionResponse { .. }))
}

pub fn convert_tools(tools: &[Tool]) -> Vec<GeminiTool> {
    vec![GeminiTool {
        function_declarations: tools
            .iter()
            .map(|t| FunctionDeclaration {
                name: t.function.name.clone(),
                description: t.function.description.clone(),
                parameters: to_openapi_schema(&t.function.parameters),
            })
            .collect(),
    }]
}

pub fn build_request(req: &ChatRequest) -> Result<GenerateContentRequest, LlmError> {
    let (contents, system_instruction) = convert_messages(&req.messages)?;
    let p = &req.params;
    Ok(GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: GenerationConfig {
            temperature: Some(p.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_output_tokens: Some(p.max_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)),
            top_p: Some(p.top_p.unwrap_or(DEFAULT_TOP_P)),
            top_k: Some(p.top_k.unwrap_or(DEFAULT_TOP_K)),
            stop_sequences: p.stop.clone(),
            seed: p.seed,
        },
        tools: req
            .tools
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(convert_tools),
    })
}

pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    match reason {
        Some("STOP") => Some(FinishReason::Stop),
        Some("MAX_TOKENS") => Some(FinishReason::Length),
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            Some(FinishReason::ContentFilter)
        }
        Some(other) => Some(FinishReason::Other(other.to_string())),
        None => None,
    }
}

fn convert_candidate(candidate: Candidate) -> Choice {
    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        match part {
            Part::Text { text: t } => text.push_str(&t),
            Part::FunctionCall { function_call } => tool_calls.push(ToolCall::function(
                format!("call_{}", uuid::Uuid::new_v4()),
                function_call.name,
                function_call.args.to_string(),
            )),
            Part::FunctionResponse { .. } | Part::Other(_) => {}
        }
    }

    let (message, finish_reason) = if tool_calls.is_empty() {
        (
            ChatMessage::assistant(text),
            parse_finish_reason(candidate.finish_reason.as_deref()),
        )
    } else {
        // Gemini reports STOP even when it asks for function calls
        (
            ChatMessage::assistant_tool_calls((!text.is_empty()).then_some(text), tool_calls),
            Some(FinishReason::ToolCalls),
        )
    };
    Choice {
        index: candidate.index,
        message,
        finish_reason,
        intermediate_messages: None,
    }
}

pub fn convert_response(response: GenerateContentResponse) -> ChatCompletionResponse {
    let usage = response.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u
            .total_token_count
            .unwrap_or(u.prompt_token_count + u.candidates_token_count),
    });
    ChatCompletionResponse {
        id: response.response_id,
        model: response.model_version,
        choices: response
            .candidates
            .into_iter()
            .map(convert_candidate)
            .collect(),
        usage,
        intermediate_responses: Vec::new(),
        termination: None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiRequestTransformer;

impl RequestTransformer for GeminiRequestTransformer {
    fn provider_id(&self) -> &str {
        "google"
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<Value, LlmError> {
        if req.model.trim().is_empty() {
            return Err(LlmError::InvalidParameter(
                "Model must be specified".to_string(),
            ));
        }
        let mut body = serde_json::to_value(build_request(req)?)?;
        req.merge_extra_into(&mut body);
        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiResponseTransformer;

impl ResponseTransformer for GeminiResponseTransformer {
    fn provider_id(&self) -> &str {
        "google"
    }

    fn transform_chat_response(&self, raw: &Value) -> Result<ChatCompletionResponse, LlmError> {
        let response: GenerateContentResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::ParseError(format!("Invalid Gemini response: {e}")))?;
        Ok(convert_response(response))
    }
}
