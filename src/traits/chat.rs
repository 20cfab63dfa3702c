//! Chat capability trait

use async_trait::async_trait;

use crate::error::LlmError;
use crate::types::{ChatCompletionResponse, ChatRequest};

#[async_trait]
pub trait ChatCapability: Send + Sync {
    /// Send one chat request. `request.model` is the bare vendor model name.
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletionResponse, LlmError>;
}
