//! Request transformation trait

use crate::error::LlmError;
use crate::types::ChatRequest;

/// Turn a normalized chat request into a provider JSON body.
pub trait RequestTransformer: Send + Sync {
    /// Provider identifier (e.g. "openai", "anthropic", "google")
    fn provider_id(&self) -> &str;

    /// Build the JSON body. `req.extra` must end up in the body without
    /// overriding fields the transformer already set.
    fn transform_chat(&self, req: &ChatRequest) -> Result<serde_json::Value, LlmError>;
}
