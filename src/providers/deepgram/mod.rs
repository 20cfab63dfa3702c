//! Deepgram speech-to-text adapter
//!
//! Transcription only. Deepgram streams over WebSocket, which this client
//! does not speak, so `transcribe_stream` is unsupported.

pub mod transformer;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use secrecy::SecretString;

use crate::error::LlmError;
use crate::executors::{AudioExecutor, HttpAudioExecutor};
use crate::providers::secret_header;
use crate::registry::BuildContext;
use crate::traits::{LlmClient, ProviderCapabilities, TranscriptionCapability};
use crate::types::{TranscriptionRequest, TranscriptionResult};

use transformer::DeepgramAudioTransformer;

pub const DEFAULT_BASE_URL: &str = "https://api.deepgram.com";
pub const API_KEY_ENV: &[&str] = &["DEEPGRAM_API_KEY"];
pub const BASE_URL_ENV: &[&str] = &["DEEPGRAM_BASE_URL"];

fn token_headers(api_key: &SecretString) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, secret_header("deepgram", "Token ", api_key)?);
    Ok(headers)
}

pub struct DeepgramClient {
    audio: HttpAudioExecutor,
}

impl DeepgramClient {
    pub fn new(ctx: &BuildContext) -> Result<Self, LlmError> {
        let config = &ctx.config;
        let api_key = config.require_api_key(API_KEY_ENV)?;
        let audio = HttpAudioExecutor {
            provider_id: "deepgram".to_string(),
            http_client: ctx.http_client.clone(),
            transformer: Arc::new(DeepgramAudioTransformer),
            base_url: config.base_url(BASE_URL_ENV, DEFAULT_BASE_URL),
            build_headers: Box::new(move || token_headers(&api_key)),
            retry_options: ctx.retry_options.clone(),
        };
        Ok(Self { audio })
    }
}

impl LlmClient for DeepgramClient {
    fn provider_id(&self) -> &str {
        "deepgram"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_transcription()
    }

    fn as_transcription_capability(&self) -> Option<&dyn TranscriptionCapability> {
        Some(self)
    }
}

#[async_trait]
impl TranscriptionCapability for DeepgramClient {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, LlmError> {
        self.audio.stt(request).await
    }
}
