//! Deepgram pre-recorded transcription (`/v1/listen`)
//!
//! Audio is posted as the raw request body; every setting travels in the
//! query string.

use serde::Deserialize;
use serde_json::Value;

use crate::error::LlmError;
use crate::transformers::audio::{AudioHttpBody, AudioTransformer, LoadedAudio};
use crate::types::{Alternative, Segment, TranscriptionRequest, TranscriptionResult, Word};

#[derive(Debug, Clone, Copy, Default)]
pub struct DeepgramAudioTransformer;

#[derive(Debug, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    metadata: Option<ListenMetadata>,
    results: ListenResults,
}

#[derive(Debug, Deserialize)]
struct ListenMetadata {
    duration: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
    #[serde(default)]
    utterances: Vec<ListenUtterance>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    detected_language: Option<String>,
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f32>,
    #[serde(default)]
    words: Vec<ListenWord>,
}

#[derive(Debug, Deserialize)]
struct ListenWord {
    word: String,
    punctuated_word: Option<String>,
    start: f32,
    end: f32,
    confidence: Option<f32>,
    speaker: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ListenUtterance {
    id: Option<String>,
    start: f32,
    end: f32,
    transcript: String,
    speaker: Option<Value>,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl AudioTransformer for DeepgramAudioTransformer {
    fn provider_id(&self) -> &str {
        "deepgram"
    }

    fn stt_endpoint(&self) -> &str {
        "/v1/listen"
    }

    fn build_stt_url(&self, base_url: &str, req: &TranscriptionRequest) -> Result<String, LlmError> {
        let mut url = reqwest::Url::parse(&format!("{base_url}{}", self.stt_endpoint()))
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid Deepgram URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("model", &req.model);
            if let Some(language) = &req.language {
                query.append_pair("language", language);
            }
            let mut options: Vec<_> = req.options.iter().collect();
            options.sort_by(|a, b| a.0.cmp(b.0));
            for (k, v) in options {
                query.append_pair(k, &value_text(v));
            }
        }
        if req.prompt.is_some() || req.response_format.is_some() {
            tracing::debug!("Deepgram ignores prompt and response_format");
        }
        Ok(url.into())
    }

    fn build_stt_body(
        &self,
        _req: &TranscriptionRequest,
        audio: LoadedAudio,
        _stream: bool,
    ) -> Result<AudioHttpBody, LlmError> {
        Ok(AudioHttpBody::Binary {
            data: audio.data,
            content_type: audio.mime_type,
        })
    }

    fn parse_stt_response(
        &self,
        _req: &TranscriptionRequest,
        body: &str,
    ) -> Result<TranscriptionResult, LlmError> {
        let parsed: ListenResponse = serde_json::from_str(body)
            .map_err(|e| LlmError::ParseError(format!("Invalid Deepgram response: {e}")))?;

        let duration = parsed.metadata.and_then(|m| m.duration);
        let segments = parsed
            .results
            .utterances
            .into_iter()
            .enumerate()
            .map(|(i, u)| Segment {
                id: u.id.unwrap_or_else(|| i.to_string()),
                start: u.start,
                end: u.end,
                text: u.transcript,
                speaker: u.speaker.as_ref().map(value_text),
            })
            .collect();

        let Some(channel) = parsed.results.channels.into_iter().next() else {
            return Ok(TranscriptionResult {
                duration,
                segments,
                ..Default::default()
            });
        };

        let alternatives = channel
            .alternatives
            .iter()
            .map(|a| Alternative {
                transcript: a.transcript.clone(),
                confidence: a.confidence,
            })
            .collect();
        let best = channel.alternatives.into_iter().next();
        let (text, confidence, words) = match best {
            Some(alt) => (
                alt.transcript,
                alt.confidence,
                alt.words
                    .into_iter()
                    .map(|w| Word {
                        word: w.punctuated_word.unwrap_or(w.word),
                        start: w.start,
                        end: w.end,
                        confidence: w.confidence,
                        speaker: w.speaker.as_ref().map(value_text),
                    })
                    .collect(),
            ),
            None => (String::new(), None, Vec::new()),
        };

        Ok(TranscriptionResult {
            text,
            language: channel.detected_language,
            confidence,
            duration,
            words,
            segments,
            alternatives,
        })
    }
}
