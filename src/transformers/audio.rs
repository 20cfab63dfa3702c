//! Speech-to-text transformers
//!
//! Providers disagree on how audio is uploaded (multipart form vs. raw body
//! with query parameters), so the transformer decides the body shape and the
//! URL while [`HttpAudioExecutor`](crate::executors::HttpAudioExecutor)
//! handles transport and error mapping.

use eventsource_stream::Event;

use crate::error::LlmError;
use crate::types::{StreamingTranscriptionChunk, TranscriptionRequest, TranscriptionResult};

/// Output body for audio HTTP requests
pub enum AudioHttpBody {
    Multipart(reqwest::multipart::Form),
    /// Raw audio bytes posted with the given content type.
    Binary { data: Vec<u8>, content_type: String },
}

/// Audio loaded from the request input with its detected MIME type.
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

pub trait AudioTransformer: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Endpoint path appended to the base URL.
    fn stt_endpoint(&self) -> &str;

    /// Full request URL. Override to add query parameters.
    fn build_stt_url(&self, base_url: &str, _req: &TranscriptionRequest) -> Result<String, LlmError> {
        Ok(format!("{base_url}{}", self.stt_endpoint()))
    }

    /// Build the request body. `stream` asks for an SSE response.
    fn build_stt_body(
        &self,
        req: &TranscriptionRequest,
        audio: LoadedAudio,
        stream: bool,
    ) -> Result<AudioHttpBody, LlmError>;

    /// Parse the response body. Some formats (`text`, `srt`, `vtt`) are not JSON.
    fn parse_stt_response(
        &self,
        req: &TranscriptionRequest,
        body: &str,
    ) -> Result<TranscriptionResult, LlmError>;

    /// Map one SSE event to a chunk. `Ok(None)` skips the event.
    fn convert_stream_event(
        &self,
        _event: &Event,
    ) -> Result<Option<StreamingTranscriptionChunk>, LlmError> {
        Err(LlmError::UnsupportedOperation(format!(
            "{} does not support streaming transcription",
            self.provider_id()
        )))
    }
}
