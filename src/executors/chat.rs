//! Chat executor
//!
//! Wires a provider's transformers to HTTP: build body, POST, classify
//! failures, parse the response.

use std::sync::Arc;

use tracing::Instrument;

use super::HeaderBuilder;
use super::errors::{classify_error_response, parse_json_text};
use crate::error::LlmError;
use crate::observability::format_headers_for_logging;
use crate::retry_api::{RetryOptions, retry_with};
use crate::transformers::{request::RequestTransformer, response::ResponseTransformer};
use crate::types::{ChatCompletionResponse, ChatRequest};

#[async_trait::async_trait]
pub trait ChatExecutor: Send + Sync {
    async fn execute(&self, req: ChatRequest) -> Result<ChatCompletionResponse, LlmError>;
}

/// Generic HTTP-based ChatExecutor
pub struct HttpChatExecutor {
    pub provider_id: String,
    pub http_client: reqwest::Client,
    pub request_transformer: Arc<dyn RequestTransformer>,
    pub response_transformer: Arc<dyn ResponseTransformer>,
    /// URL for a request; some vendors put the model in the path.
    pub build_url: Box<dyn Fn(&ChatRequest) -> String + Send + Sync>,
    pub build_headers: HeaderBuilder,
    pub retry_options: Option<RetryOptions>,
}

impl HttpChatExecutor {
    async fn send_once(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let headers = (self.build_headers)()?;
        tracing::debug!(
            url = %url,
            headers = %format_headers_for_logging(&headers),
            "Sending chat request"
        );

        let resp = self
            .http_client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(classify_error_response(&self.provider_id, resp).await);
        }

        let text = resp
            .text()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;
        let json = parse_json_text(&text)?;
        self.response_transformer.transform_chat_response(&json)
    }
}

#[async_trait::async_trait]
impl ChatExecutor for HttpChatExecutor {
    async fn execute(&self, req: ChatRequest) -> Result<ChatCompletionResponse, LlmError> {
        let span = tracing::info_span!(
            "chat_request",
            provider = %self.provider_id,
            model = %req.model,
            messages = req.messages.len(),
        );
        async {
            let body = self.request_transformer.transform_chat(&req)?;
            let url = (self.build_url)(&req);
            let started = std::time::Instant::now();

            let result = match &self.retry_options {
                Some(options) => retry_with(|| self.send_once(&url, &body), options).await,
                None => self.send_once(&url, &body).await,
            };

            match &result {
                Ok(resp) => tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    finish_reason = ?resp.finish_reason(),
                    tool_calls = resp.tool_calls().len(),
                    "Chat request completed"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Chat request failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}
