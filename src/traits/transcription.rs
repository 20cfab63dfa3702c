//! Speech-to-text capability trait

use async_trait::async_trait;

use crate::error::LlmError;
use crate::types::{TranscriptionRequest, TranscriptionResult, TranscriptionStream};

#[async_trait]
pub trait TranscriptionCapability: Send + Sync {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, LlmError>;

    /// Incremental transcription. The stream ends right after the chunk
    /// flagged `is_final`.
    async fn transcribe_stream(
        &self,
        _request: TranscriptionRequest,
    ) -> Result<TranscriptionStream, LlmError> {
        Err(LlmError::UnsupportedOperation(
            "Streaming transcription not supported by this provider".to_string(),
        ))
    }
}
