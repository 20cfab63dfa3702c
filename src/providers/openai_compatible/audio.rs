//! Whisper-style transcription (`/audio/transcriptions`)

use eventsource_stream::Event;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use super::spec::CompatProviderSpec;
use crate::error::LlmError;
use crate::transformers::audio::{AudioHttpBody, AudioTransformer, LoadedAudio};
use crate::types::{
    Segment, StreamingTranscriptionChunk, TranscriptionRequest, TranscriptionResult, Word,
};

/// Response formats that come back as plain text rather than JSON.
const TEXT_FORMATS: &[&str] = &["text", "srt", "vtt"];

#[derive(Debug, Clone, Copy)]
pub struct OpenAiCompatAudioTransformer {
    pub spec: CompatProviderSpec,
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    language: Option<String>,
    duration: Option<f32>,
    #[serde(default)]
    words: Vec<WhisperWord>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f32,
    end: f32,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    id: Value,
    start: f32,
    end: f32,
    text: String,
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl AudioTransformer for OpenAiCompatAudioTransformer {
    fn provider_id(&self) -> &str {
        self.spec.id
    }

    fn stt_endpoint(&self) -> &str {
        self.spec.transcription_path.unwrap_or("/audio/transcriptions")
    }

    fn build_stt_body(
        &self,
        req: &TranscriptionRequest,
        audio: LoadedAudio,
        stream: bool,
    ) -> Result<AudioHttpBody, LlmError> {
        let part = Part::bytes(audio.data)
            .file_name(audio.file_name)
            .mime_str(&audio.mime_type)
            .map_err(|e| LlmError::InvalidParameter(format!("Invalid audio MIME type: {e}")))?;

        let mut form = Form::new().part("file", part).text("model", req.model.clone());
        if let Some(language) = &req.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &req.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(t) = req.temperature {
            form = form.text("temperature", t.to_string());
        }
        if let Some(format) = &req.response_format {
            form = form.text("response_format", format.clone());
        }
        if let Some(granularities) = &req.timestamp_granularities {
            for g in granularities {
                form = form.text("timestamp_granularities[]", g.clone());
            }
        }
        let mut options: Vec<_> = req.options.iter().collect();
        options.sort_by(|a, b| a.0.cmp(b.0));
        for (k, v) in options {
            form = form.text(k.clone(), option_text(v));
        }
        if stream {
            form = form.text("stream", "true");
        }
        Ok(AudioHttpBody::Multipart(form))
    }

    fn parse_stt_response(
        &self,
        req: &TranscriptionRequest,
        body: &str,
    ) -> Result<TranscriptionResult, LlmError> {
        if req
            .response_format
            .as_deref()
            .is_some_and(|f| TEXT_FORMATS.contains(&f))
        {
            return Ok(TranscriptionResult::from_text(body.trim_end()));
        }
        let parsed: WhisperResponse = serde_json::from_str(body).map_err(|e| {
            LlmError::ParseError(format!("Invalid {} transcription response: {e}", self.spec.id))
        })?;
        Ok(TranscriptionResult {
            text: parsed.text,
            language: parsed.language,
            confidence: None,
            duration: parsed.duration,
            words: parsed
                .words
                .into_iter()
                .map(|w| Word {
                    word: w.word,
                    start: w.start,
                    end: w.end,
                    confidence: None,
                    speaker: None,
                })
                .collect(),
            segments: parsed
                .segments
                .into_iter()
                .map(|s| Segment {
                    id: option_text(&s.id),
                    start: s.start,
                    end: s.end,
                    text: s.text,
                    speaker: None,
                })
                .collect(),
            alternatives: Vec::new(),
        })
    }

    fn convert_stream_event(
        &self,
        event: &Event,
    ) -> Result<Option<StreamingTranscriptionChunk>, LlmError> {
        if !self.spec.streaming_transcription {
            return Err(LlmError::UnsupportedOperation(format!(
                "{} does not support streaming transcription",
                self.spec.id
            )));
        }
        let data: Value = serde_json::from_str(&event.data).map_err(|e| {
            LlmError::ParseError(format!("Invalid transcription stream event: {e}"))
        })?;
        let kind = data
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(event.event.as_str());
        match kind {
            "transcript.text.delta" => Ok(data
                .get("delta")
                .and_then(Value::as_str)
                .map(StreamingTranscriptionChunk::partial)),
            "transcript.text.done" => Ok(Some(StreamingTranscriptionChunk::final_chunk(
                data.get("text").and_then(Value::as_str).unwrap_or_default(),
            ))),
            _ => Ok(None),
        }
    }
}
