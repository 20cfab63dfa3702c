//! Speech-to-text types

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Audio source for a transcription request.
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Read from disk when the request is sent.
    Path(PathBuf),
    /// In-memory audio with a file name used for the multipart upload.
    Bytes { data: Vec<u8>, file_name: String },
}

impl AudioInput {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self::Bytes {
            data,
            file_name: file_name.into(),
        }
    }

    /// Load the audio bytes and derive a file name.
    pub async fn load(&self) -> Result<(Vec<u8>, String), LlmError> {
        match self {
            Self::Path(path) => {
                let data = tokio::fs::read(path).await.map_err(|e| {
                    LlmError::IoError(format!(
                        "Failed to read audio file '{}': {e}",
                        path.display()
                    ))
                })?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "audio".to_string());
                Ok((data, file_name))
            }
            Self::Bytes { data, file_name } => Ok((data.clone(), file_name.clone())),
        }
    }
}

/// Normalized transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// `provider:model` identifier when built by the caller; adapters receive
    /// the bare model name.
    pub model: String,
    pub audio: AudioInput,
    /// ISO-639-1 language hint.
    pub language: Option<String>,
    /// Text to guide the model's style or vocabulary.
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
    /// Vendor response format (e.g. `json`, `verbose_json`, `text`).
    pub response_format: Option<String>,
    /// `word` and/or `segment` timestamps.
    pub timestamp_granularities: Option<Vec<String>>,
    /// Provider-specific options forwarded verbatim.
    pub options: HashMap<String, serde_json::Value>,
}

impl TranscriptionRequest {
    pub fn new(model: impl Into<String>, audio: AudioInput) -> Self {
        Self {
            model: model.into(),
            audio,
            language: None,
            prompt: None,
            temperature: None,
            response_format: None,
            timestamp_granularities: None,
            options: HashMap::new(),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = Some(format.into());
        self
    }

    pub fn timestamp_granularities(mut self, granularities: Vec<String>) -> Self {
        self.timestamp_granularities = Some(granularities);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// A recognized word with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f32,
    pub end: f32,
    pub confidence: Option<f32>,
    pub speaker: Option<String>,
}

/// A transcript segment with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub start: f32,
    pub end: f32,
    pub text: String,
    pub speaker: Option<String>,
}

/// An alternative transcript hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

/// Normalized transcription result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: Option<String>,
    pub confidence: Option<f32>,
    /// Audio duration in seconds.
    pub duration: Option<f32>,
    pub words: Vec<Word>,
    pub segments: Vec<Segment>,
    pub alternatives: Vec<Alternative>,
}

impl TranscriptionResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A partial result from a streaming transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingTranscriptionChunk {
    pub text: String,
    pub is_final: bool,
    pub confidence: Option<f32>,
}

impl StreamingTranscriptionChunk {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            confidence: None,
        }
    }

    pub fn final_chunk(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            confidence: None,
        }
    }
}

/// Lazy, order-preserving stream of transcription chunks.
///
/// The stream ends right after the chunk flagged `is_final`. It is consumed by
/// value; retrying requires requesting a new stream.
pub type TranscriptionStream =
    Pin<Box<dyn Stream<Item = Result<StreamingTranscriptionChunk, LlmError>> + Send>>;
