//! Response transformation trait

use crate::error::LlmError;
use crate::types::ChatCompletionResponse;

/// Turn a provider JSON response into the normalized response.
pub trait ResponseTransformer: Send + Sync {
    fn provider_id(&self) -> &str;

    fn transform_chat_response(
        &self,
        raw: &serde_json::Value,
    ) -> Result<ChatCompletionResponse, LlmError>;
}
