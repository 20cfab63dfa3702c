//! Normalized chat request handed to provider adapters.

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;
use super::tools::Tool;

/// Generation parameters shared by every provider.
///
/// Adapters map these onto vendor parameter names; unset values are omitted
/// from the wire request unless the adapter has a documented default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub seed: Option<u64>,
}

/// Provider-facing chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Model name with the provider prefix already stripped.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: CommonParams,
    pub tools: Option<Vec<Tool>>,
    /// Vendor-specific fields merged verbatim into the request body.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            params: CommonParams::default(),
            tools: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_params(mut self, params: CommonParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Merge `extra` into a JSON body without overwriting keys the adapter set.
    pub fn merge_extra_into(&self, body: &mut serde_json::Value) {
        if let Some(obj) = body.as_object_mut() {
            for (k, v) in &self.extra {
                obj.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
    }
}
