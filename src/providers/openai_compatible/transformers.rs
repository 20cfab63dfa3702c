//! Chat transformers for the OpenAI wire format

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::spec::CompatProviderSpec;
use crate::error::LlmError;
use crate::transformers::{request::RequestTransformer, response::ResponseTransformer};
use crate::types::{
    ChatCompletionResponse, ChatMessage, ChatRequest, Choice, FinishReason, MessageRole, ToolCall,
    Usage,
};

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<&'a [ToolCall]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(m: &'a ChatMessage) -> Self {
        Self {
            role: m.role.as_str(),
            content: m.content.as_deref(),
            tool_calls: m.tool_calls.as_deref().filter(|c| !c.is_empty()),
            tool_call_id: m.tool_call_id.as_deref(),
            // tool messages are matched by `tool_call_id`
            name: match m.role {
                MessageRole::Tool => None,
                _ => m.name.as_deref(),
            },
        }
    }
}

/// Request transformer for OpenAI-compatible vendors
#[derive(Debug, Clone, Copy)]
pub struct OpenAiCompatRequestTransformer {
    pub spec: CompatProviderSpec,
}

impl RequestTransformer for OpenAiCompatRequestTransformer {
    fn provider_id(&self) -> &str {
        self.spec.id
    }

    fn transform_chat(&self, req: &ChatRequest) -> Result<Value, LlmError> {
        if req.model.trim().is_empty() {
            return Err(LlmError::InvalidParameter(
                "Model must be specified".to_string(),
            ));
        }
        let messages: Vec<OpenAiMessage<'_>> = req.messages.iter().map(Into::into).collect();
        let mut body = json!({
            "model": req.model,
            "messages": messages,
        });

        let p = &req.params;
        if let Some(t) = p.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(m) = p.max_tokens {
            body["max_tokens"] = json!(m);
        }
        if let Some(tp) = p.top_p {
            body["top_p"] = json!(tp);
        }
        if let Some(stop) = &p.stop {
            body["stop"] = json!(stop);
        }
        if let Some(seed) = p.seed {
            body[self.spec.seed_field] = json!(seed);
        }
        if p.top_k.is_some() {
            tracing::debug!(
                provider = %self.spec.id,
                "top_k has no OpenAI-compatible counterpart; pass it through `extra` if the vendor accepts it"
            );
        }
        if let Some(tools) = &req.tools {
            body["tools"] = serde_json::to_value(tools)?;
        }

        req.merge_extra_into(&mut body);
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    #[serde(default)]
    index: u32,
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    total_tokens: Option<u32>,
}

/// Response transformer for OpenAI-compatible vendors
#[derive(Debug, Clone, Copy)]
pub struct OpenAiCompatResponseTransformer {
    pub spec: CompatProviderSpec,
}

impl ResponseTransformer for OpenAiCompatResponseTransformer {
    fn provider_id(&self) -> &str {
        self.spec.id
    }

    fn transform_chat_response(&self, raw: &Value) -> Result<ChatCompletionResponse, LlmError> {
        let response: OpenAiChatResponse = serde_json::from_value(raw.clone()).map_err(|e| {
            LlmError::ParseError(format!("Invalid {} response: {e}", self.spec.id))
        })?;

        let choices = response
            .choices
            .into_iter()
            .map(|c| {
                let tool_calls = c.message.tool_calls.filter(|calls| !calls.is_empty());
                let mut message = match tool_calls {
                    Some(calls) => ChatMessage::assistant_tool_calls(c.message.content, calls),
                    None => ChatMessage::assistant(c.message.content.unwrap_or_default()),
                };
                if message.content.as_deref() == Some("") && message.has_tool_calls() {
                    message.content = None;
                }
                Choice {
                    index: c.index,
                    message,
                    finish_reason: c.finish_reason.as_deref().map(FinishReason::from_openai),
                    intermediate_messages: None,
                }
            })
            .collect();

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u
                .total_tokens
                .unwrap_or(u.prompt_tokens + u.completion_tokens),
        });

        Ok(ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
            intermediate_responses: Vec::new(),
            termination: None,
        })
    }
}
