//! Google Gemini adapter
//!
//! Talks to the Gemini API (`generativelanguage.googleapis.com`) with an API
//! key, or to Vertex AI with a bearer token when a project is configured.
//! Gemini has no speech-to-text endpoint here; transcription is reported as
//! unsupported by the client.

pub mod convert;
pub mod schema;
pub mod types;
pub mod vertex;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use secrecy::SecretString;

use crate::error::LlmError;
use crate::executors::{ChatExecutor, HeaderBuilder, HttpChatExecutor};
use crate::providers::secret_header;
use crate::registry::BuildContext;
use crate::traits::{ChatCapability, LlmClient, ProviderCapabilities};
use crate::types::{ChatCompletionResponse, ChatRequest};

use convert::{GeminiRequestTransformer, GeminiResponseTransformer};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const API_KEY_ENV: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Every env var the Google adapter may read.
pub fn env_keys() -> Vec<&'static str> {
    [
        API_KEY_ENV,
        vertex::PROJECT_ENV,
        vertex::REGION_ENV,
        vertex::CREDENTIALS_ENV,
        vertex::TOKEN_ENV,
    ]
    .concat()
}

fn api_key_headers(api_key: &SecretString) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert("x-goog-api-key", secret_header("google", "", api_key)?);
    Ok(headers)
}

fn bearer_headers(token: &SecretString) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, secret_header("google", "Bearer ", token)?);
    Ok(headers)
}

pub struct GoogleClient {
    chat: HttpChatExecutor,
}

impl GoogleClient {
    pub fn new(ctx: &BuildContext) -> Result<Self, LlmError> {
        let config = &ctx.config;
        let target = vertex::resolve(config, API_KEY_ENV)?;

        let build_url: Box<dyn Fn(&ChatRequest) -> String + Send + Sync>;
        let build_headers: HeaderBuilder;
        match target {
            Some(target) => {
                let token = config.require_api_key(vertex::TOKEN_ENV)?;
                tracing::debug!(project = %target.project, region = %target.region, "Using Vertex AI");
                build_url = Box::new(move |req: &ChatRequest| target.generate_content_url(&req.model));
                build_headers = Box::new(move || bearer_headers(&token));
            }
            None => {
                let api_key = config.require_api_key(API_KEY_ENV)?;
                let base_url = config.base_url(&[], DEFAULT_BASE_URL);
                build_url = Box::new(move |req: &ChatRequest| {
                    format!(
                        "{base_url}/v1beta/models/{}:generateContent",
                        req.model.trim_start_matches("models/")
                    )
                });
                build_headers = Box::new(move || api_key_headers(&api_key));
            }
        }

        let chat = HttpChatExecutor {
            provider_id: "google".to_string(),
            http_client: ctx.http_client.clone(),
            request_transformer: Arc::new(GeminiRequestTransformer),
            response_transformer: Arc::new(GeminiResponseTransformer),
            build_url,
            build_headers,
            retry_options: ctx.retry_options.clone(),
        };
        Ok(Self { chat })
    }
}

impl LlmClient for GoogleClient {
    fn provider_id(&self) -> &str {
        "google"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_chat()
    }

    fn as_chat_capability(&self) -> Option<&dyn ChatCapability> {
        Some(self)
    }
}

#[async_trait]
impl ChatCapability for GoogleClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletionResponse, LlmError> {
        self.chat.execute(request).await
    }
}
