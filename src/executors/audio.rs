//! Speech-to-text executor

use std::sync::Arc;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use tracing::Instrument;

use super::HeaderBuilder;
use super::errors::classify_error_response;
use crate::error::LlmError;
use crate::retry_api::{RetryOptions, retry_with};
use crate::transformers::audio::{AudioHttpBody, AudioTransformer, LoadedAudio};
use crate::types::{
    StreamingTranscriptionChunk, TranscriptionRequest, TranscriptionResult, TranscriptionStream,
};
use crate::utils::mime::guess_mime;

#[async_trait::async_trait]
pub trait AudioExecutor: Send + Sync {
    async fn stt(&self, req: TranscriptionRequest) -> Result<TranscriptionResult, LlmError>;
    async fn stt_stream(&self, req: TranscriptionRequest) -> Result<TranscriptionStream, LlmError>;
}

pub struct HttpAudioExecutor {
    pub provider_id: String,
    pub http_client: reqwest::Client,
    pub transformer: Arc<dyn AudioTransformer>,
    pub base_url: String,
    pub build_headers: HeaderBuilder,
    pub retry_options: Option<RetryOptions>,
}

async fn load_audio(req: &TranscriptionRequest) -> Result<LoadedAudio, LlmError> {
    let (data, file_name) = req.audio.load().await?;
    let mime_type = guess_mime(Some(&data), Some(&file_name));
    Ok(LoadedAudio {
        data,
        file_name,
        mime_type,
    })
}

impl HttpAudioExecutor {
    async fn send(
        &self,
        req: &TranscriptionRequest,
        audio: LoadedAudio,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let url = self.transformer.build_stt_url(&self.base_url, req)?;
        let body = self.transformer.build_stt_body(req, audio, stream)?;
        let headers = (self.build_headers)()?;
        tracing::debug!(url = %url, stream, "Sending transcription request");

        let builder = self.http_client.post(url).headers(headers);
        let resp = match body {
            AudioHttpBody::Multipart(form) => builder.multipart(form).send().await,
            AudioHttpBody::Binary { data, content_type } => {
                builder
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(data)
                    .send()
                    .await
            }
        }
        .map_err(|e| LlmError::HttpError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(classify_error_response(&self.provider_id, resp).await);
        }
        Ok(resp)
    }

    async fn stt_once(
        &self,
        req: &TranscriptionRequest,
        audio: LoadedAudio,
    ) -> Result<TranscriptionResult, LlmError> {
        let resp = self.send(req, audio, false).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;
        self.transformer.parse_stt_response(req, &text)
    }
}

#[async_trait::async_trait]
impl AudioExecutor for HttpAudioExecutor {
    async fn stt(&self, req: TranscriptionRequest) -> Result<TranscriptionResult, LlmError> {
        let span = tracing::info_span!(
            "transcription_request",
            provider = %self.provider_id,
            model = %req.model,
        );
        async {
            let audio = load_audio(&req).await?;
            let result = match &self.retry_options {
                Some(options) => {
                    retry_with(|| self.stt_once(&req, audio.clone()), options).await
                }
                None => self.stt_once(&req, audio).await,
            };
            match &result {
                Ok(r) => tracing::info!(chars = r.text.len(), "Transcription completed"),
                Err(e) => tracing::error!(error = %e, "Transcription failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn stt_stream(&self, req: TranscriptionRequest) -> Result<TranscriptionStream, LlmError> {
        let audio = load_audio(&req).await?;
        let resp = self.send(&req, audio, true).await?;

        let transformer = self.transformer.clone();
        let provider = self.provider_id.clone();
        let mut events = resp.bytes_stream().eventsource();

        let stream = async_stream::stream! {
            let mut accumulated = String::new();
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(LlmError::StreamError(format!("{provider} stream error: {e}")));
                        return;
                    }
                };
                if event.data.trim() == "[DONE]" {
                    break;
                }
                match transformer.convert_stream_event(&event) {
                    Ok(Some(chunk)) => {
                        let is_final = chunk.is_final;
                        if !is_final {
                            accumulated.push_str(&chunk.text);
                        }
                        yield Ok(chunk);
                        if is_final {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
            tracing::debug!(provider = %provider, "Stream closed without a final event");
            yield Ok(StreamingTranscriptionChunk::final_chunk(accumulated));
        };
        Ok(Box::pin(stream))
    }
}
