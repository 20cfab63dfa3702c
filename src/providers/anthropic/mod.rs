//! Anthropic Messages API adapter

pub mod transformers;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::SecretString;

use crate::error::LlmError;
use crate::executors::{ChatExecutor, HttpChatExecutor};
use crate::providers::{config_header, extra_str, secret_header};
use crate::registry::BuildContext;
use crate::traits::{ChatCapability, LlmClient, ProviderCapabilities};
use crate::types::{ChatCompletionResponse, ChatRequest};

use transformers::{AnthropicRequestTransformer, AnthropicResponseTransformer};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const API_KEY_ENV: &[&str] = &["ANTHROPIC_API_KEY"];
pub const BASE_URL_ENV: &[&str] = &["ANTHROPIC_BASE_URL"];

fn build_headers(api_key: &SecretString, version: &str) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", secret_header("anthropic", "", api_key)?);
    headers.insert(
        "anthropic-version",
        config_header("anthropic", "anthropic-version", version)?,
    );
    Ok(headers)
}

/// Anthropic Claude adapter
pub struct AnthropicClient {
    chat: HttpChatExecutor,
}

impl AnthropicClient {
    /// `extra.anthropic_version` overrides the `anthropic-version` header.
    pub fn new(ctx: &BuildContext) -> Result<Self, LlmError> {
        let config = &ctx.config;
        let api_key = config.require_api_key(API_KEY_ENV)?;
        let base_url = config.base_url(BASE_URL_ENV, DEFAULT_BASE_URL);
        let version =
            extra_str(config, "anthropic_version").unwrap_or_else(|| DEFAULT_API_VERSION.into());

        let url = format!("{base_url}/v1/messages");
        let chat = HttpChatExecutor {
            provider_id: "anthropic".to_string(),
            http_client: ctx.http_client.clone(),
            request_transformer: Arc::new(AnthropicRequestTransformer),
            response_transformer: Arc::new(AnthropicResponseTransformer),
            build_url: Box::new(move |_: &ChatRequest| url.clone()),
            build_headers: Box::new(move || build_headers(&api_key, &version)),
            retry_options: ctx.retry_options.clone(),
        };
        Ok(Self { chat })
    }
}

impl LlmClient for AnthropicClient {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_chat()
    }

    fn as_chat_capability(&self) -> Option<&dyn ChatCapability> {
        Some(self)
    }
}

#[async_trait]
impl ChatCapability for AnthropicClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletionResponse, LlmError> {
        self.chat.execute(request).await
    }
}
