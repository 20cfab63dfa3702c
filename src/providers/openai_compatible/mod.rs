//! OpenAI and OpenAI-compatible vendors
//!
//! One adapter serves every vendor that speaks the OpenAI chat format; the
//! per-vendor differences (base URL, credentials, transcription support,
//! parameter names) live in [`spec`].

pub mod audio;
pub mod spec;
pub mod transformers;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use secrecy::SecretString;

use crate::error::LlmError;
use crate::executors::{
    AudioExecutor, ChatExecutor, HeaderBuilder, HttpAudioExecutor, HttpChatExecutor,
};
use crate::providers::{config_header, extra_str, secret_header};
use crate::registry::BuildContext;
use crate::traits::{ChatCapability, LlmClient, ProviderCapabilities, TranscriptionCapability};
use crate::types::{
    ChatCompletionResponse, ChatRequest, TranscriptionRequest, TranscriptionResult,
    TranscriptionStream,
};

use audio::OpenAiCompatAudioTransformer;
use spec::CompatProviderSpec;
use transformers::{OpenAiCompatRequestTransformer, OpenAiCompatResponseTransformer};

/// Adapter for an OpenAI-compatible vendor.
pub struct OpenAiCompatibleClient {
    spec: CompatProviderSpec,
    chat: HttpChatExecutor,
    audio: Option<HttpAudioExecutor>,
}

#[derive(Clone)]
struct Credentials {
    provider: &'static str,
    api_key: Option<SecretString>,
    organization: Option<String>,
    project: Option<String>,
}

impl Credentials {
    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            headers.insert(AUTHORIZATION, secret_header(self.provider, "Bearer ", key)?);
        }
        if let Some(org) = &self.organization {
            headers.insert(
                "OpenAI-Organization",
                config_header(self.provider, "OpenAI-Organization", org)?,
            );
        }
        if let Some(project) = &self.project {
            headers.insert(
                "OpenAI-Project",
                config_header(self.provider, "OpenAI-Project", project)?,
            );
        }
        Ok(headers)
    }

    fn builder(&self) -> HeaderBuilder {
        let creds = self.clone();
        Box::new(move || creds.headers())
    }
}

impl OpenAiCompatibleClient {
    /// Build the adapter. Fails with `ConfigurationError` when the vendor
    /// needs a key and neither the config nor the environment has one.
    pub fn new(spec: CompatProviderSpec, ctx: &BuildContext) -> Result<Self, LlmError> {
        let config = &ctx.config;
        let api_key = if spec.requires_api_key() {
            Some(config.require_api_key(spec.api_key_env)?)
        } else {
            config.api_key(&[])
        };
        let base_url = config.base_url(spec.base_url_env, spec.default_base_url);
        let credentials = Credentials {
            provider: spec.id,
            api_key,
            organization: extra_str(config, "organization"),
            project: extra_str(config, "project"),
        };

        let chat_url = format!("{base_url}{}", spec.chat_path);
        let chat = HttpChatExecutor {
            provider_id: spec.id.to_string(),
            http_client: ctx.http_client.clone(),
            request_transformer: Arc::new(OpenAiCompatRequestTransformer { spec }),
            response_transformer: Arc::new(OpenAiCompatResponseTransformer { spec }),
            build_url: Box::new(move |_: &ChatRequest| chat_url.clone()),
            build_headers: credentials.builder(),
            retry_options: ctx.retry_options.clone(),
        };

        let audio = spec.transcription_path.map(|_| HttpAudioExecutor {
            provider_id: spec.id.to_string(),
            http_client: ctx.http_client.clone(),
            transformer: Arc::new(OpenAiCompatAudioTransformer { spec }),
            base_url: base_url.clone(),
            build_headers: credentials.builder(),
            retry_options: ctx.retry_options.clone(),
        });

        tracing::debug!(provider = %spec.id, base_url = %base_url, "Built OpenAI-compatible adapter");
        Ok(Self { spec, chat, audio })
    }

    pub fn spec(&self) -> &CompatProviderSpec {
        &self.spec
    }
}

impl LlmClient for OpenAiCompatibleClient {
    fn provider_id(&self) -> &str {
        self.spec.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        let mut caps = ProviderCapabilities::new().with_chat();
        if self.audio.is_some() {
            caps = caps.with_transcription();
        }
        if self.spec.streaming_transcription {
            caps = caps.with_streaming_transcription();
        }
        caps
    }

    fn as_chat_capability(&self) -> Option<&dyn ChatCapability> {
        Some(self)
    }

    fn as_transcription_capability(&self) -> Option<&dyn TranscriptionCapability> {
        self.audio.as_ref().map(|_| self as &dyn TranscriptionCapability)
    }
}

#[async_trait]
impl ChatCapability for OpenAiCompatibleClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletionResponse, LlmError> {
        self.chat.execute(request).await
    }
}

impl OpenAiCompatibleClient {
    fn audio_executor(&self) -> Result<&HttpAudioExecutor, LlmError> {
        self.audio.as_ref().ok_or_else(|| {
            LlmError::UnsupportedOperation(format!(
                "{} does not support transcription",
                self.spec.id
            ))
        })
    }
}

#[async_trait]
impl TranscriptionCapability for OpenAiCompatibleClient {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, LlmError> {
        self.audio_executor()?.stt(request).await
    }

    async fn transcribe_stream(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionStream, LlmError> {
        if !self.spec.streaming_transcription {
            return Err(LlmError::UnsupportedOperation(format!(
                "{} does not support streaming transcription",
                self.spec.id
            )));
        }
        self.audio_executor()?.stt_stream(request).await
    }
}
