//! Automatic tool execution.
//!
//! The loop is: ask → tool calls → run tools → re-ask, bounded by
//! `max_turns`. A turn is one provider response that requested tools and had
//! them executed. The orchestrator never issues more than `max_turns`
//! provider calls; running out of turns is a normal termination, not an error.

use async_trait::async_trait;
use serde_json::Value;
use tracing::Instrument;

use crate::error::LlmError;
use crate::traits::ChatCapability;
use crate::types::{ChatCompletionResponse, ChatMessage, ChatRequest, Termination, ToolCall};

/// How tool failures (bad arguments, handler errors) are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolExecutionMode {
    /// Report the failure to the model as the tool result and keep going.
    #[default]
    Lenient,
    /// Abort orchestration with [`LlmError::ToolExecutionError`].
    Strict,
}

/// Looks up and runs tools by name.
#[async_trait]
pub trait ToolResolver: Send + Sync {
    fn contains_tool(&self, name: &str) -> bool;

    /// Check parsed arguments before [`call_tool`](Self::call_tool); the
    /// error text is reported as the tool failure.
    fn validate_arguments(&self, _name: &str, _arguments: &Value) -> Result<(), String> {
        Ok(())
    }

    /// Execute a tool with structured JSON arguments.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, LlmError>;
}

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    /// Values below 1 are treated as 1.
    pub max_turns: u32,
    pub tool_execution: ToolExecutionMode,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_turns: 1,
            tool_execution: ToolExecutionMode::Lenient,
        }
    }
}

fn render_tool_output(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn tool_failure(mode: ToolExecutionMode, name: &str, message: String) -> Result<String, LlmError> {
    match mode {
        ToolExecutionMode::Lenient => {
            tracing::warn!(tool = %name, error = %message, "Tool failed, reporting to model");
            Ok(format!("<tool error: {message}>"))
        }
        ToolExecutionMode::Strict => Err(LlmError::ToolExecutionError {
            name: name.to_string(),
            message,
        }),
    }
}

/// Run one requested call and produce the tool message content.
async fn execute_call(
    resolver: &dyn ToolResolver,
    call: &ToolCall,
    mode: ToolExecutionMode,
) -> Result<String, LlmError> {
    let name = call.function.name.as_str();
    if !resolver.contains_tool(name) {
        return Err(LlmError::ToolNotFound(name.to_string()));
    }

    let args = match call.parsed_arguments() {
        Ok(v) => v,
        Err(e) => return tool_failure(mode, name, format!("Invalid JSON arguments: {e}")),
    };
    if let Err(reason) = resolver.validate_arguments(name, &args) {
        return tool_failure(mode, name, reason);
    }

    tracing::debug!(tool = %name, call_id = %call.id, "Invoking tool");
    match resolver.call_tool(name, args).await {
        Ok(value) => Ok(render_tool_output(value)),
        Err(e @ LlmError::ToolNotFound(_)) => Err(e),
        Err(LlmError::ToolExecutionError { message, .. }) => tool_failure(mode, name, message),
        Err(e) => tool_failure(mode, name, e.to_string()),
    }
}

fn finish(
    mut resp: ChatCompletionResponse,
    history: Vec<ChatMessage>,
    earlier: Vec<ChatCompletionResponse>,
    termination: Termination,
) -> ChatCompletionResponse {
    if let Some(choice) = resp.choices.first_mut() {
        choice.intermediate_messages = Some(history);
    }
    resp.intermediate_responses = earlier;
    resp.termination = Some(termination);
    resp
}

/// Drive the tool-calling loop.
///
/// `request.messages` is the caller's conversation; it is cloned, never
/// mutated. The returned response is the last provider response with:
/// - `choices[0].intermediate_messages`: caller messages plus every
///   assistant and tool message produced (and the final assistant message
///   when the model completed),
/// - `intermediate_responses`: every earlier provider response,
/// - `termination`: why the loop stopped.
pub async fn generate(
    model: &dyn ChatCapability,
    request: ChatRequest,
    resolver: &dyn ToolResolver,
    opts: OrchestratorOptions,
) -> Result<ChatCompletionResponse, LlmError> {
    let max_turns = opts.max_turns.max(1);
    let span = tracing::info_span!(
        "tool_orchestration",
        model = %request.model,
        max_turns,
        mode = ?opts.tool_execution,
    );

    async move {
        let mut history = request.messages.clone();
        let mut earlier: Vec<ChatCompletionResponse> = Vec::new();
        let mut turns_used: u32 = 0;

        loop {
            let mut turn_request = request.clone();
            turn_request.messages = history.clone();
            let resp = model.chat(turn_request).await?;

            let calls = resp.tool_calls().to_vec();
            tracing::debug!(turn = turns_used + 1, tool_calls = calls.len(), "Turn completed");

            if calls.is_empty() {
                if let Some(message) = resp.message() {
                    history.push(message.clone());
                }
                tracing::info!(turns_used, "Orchestration completed");
                return Ok(finish(resp, history, earlier, Termination::Completed));
            }

            let content = resp
                .content_text()
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            history.push(ChatMessage::assistant_tool_calls(content, calls.clone()));
            for call in &calls {
                let output = execute_call(resolver, call, opts.tool_execution).await?;
                history.push(
                    ChatMessage::tool(output, call.id.clone()).with_name(call.function.name.clone()),
                );
            }

            turns_used += 1;
            if turns_used >= max_turns {
                tracing::info!(turns_used, "Turn limit reached");
                return Ok(finish(resp, history, earlier, Termination::TurnLimitReached));
            }
            earlier.push(resp);
        }
    }
    .instrument(span)
    .await
}
