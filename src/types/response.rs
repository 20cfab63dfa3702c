//! Normalized chat completion response.

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;
use super::tools::ToolCall;

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop or stop sequence (OpenAI `stop`, Anthropic `end_turn`, Gemini `STOP`).
    Stop,
    /// Token limit reached (`length`, `max_tokens`, `MAX_TOKENS`).
    Length,
    /// The model requested tool calls.
    ToolCalls,
    /// Output blocked by a safety filter.
    ContentFilter,
    /// Any vendor reason without a normalized counterpart.
    Other(String),
}

impl FinishReason {
    /// Map an OpenAI-style finish reason string.
    pub fn from_openai(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "tool_calls" | "function_call" => Self::ToolCalls,
            "content_filter" => Self::ContentFilter,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Token accounting reported by the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Accumulate usage from another turn.
    pub fn add(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// How an automatic tool-calling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model produced an answer without further tool calls.
    Completed,
    /// The turn budget ran out; the last response is returned as-is.
    TurnLimitReached,
}

/// One completion choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<FinishReason>,
    /// Full message trace accumulated during automatic tool execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_messages: Option<Vec<ChatMessage>>,
}

/// Provider-agnostic chat completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    /// Responses of the earlier turns of an automatic tool-calling run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate_responses: Vec<ChatCompletionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
}

impl ChatCompletionResponse {
    /// Build a single-choice response.
    pub fn from_message(message: ChatMessage, finish_reason: Option<FinishReason>) -> Self {
        Self {
            id: None,
            model: None,
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason,
                intermediate_messages: None,
            }],
            usage: None,
            intermediate_responses: Vec::new(),
            termination: None,
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_usage(mut self, usage: Option<Usage>) -> Self {
        self.usage = usage;
        self
    }

    /// First choice's message.
    pub fn message(&self) -> Option<&ChatMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// First choice's text content.
    pub fn content_text(&self) -> Option<&str> {
        self.message().and_then(|m| m.content.as_deref())
    }

    /// Tool calls requested by the first choice.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message().map(|m| m.tool_calls()).unwrap_or_default()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.choices.first().and_then(|c| c.finish_reason.as_ref())
    }

    /// Trace accumulated by the orchestrator, when present.
    pub fn intermediate_messages(&self) -> Option<&[ChatMessage]> {
        self.choices
            .first()
            .and_then(|c| c.intermediate_messages.as_deref())
    }
}
