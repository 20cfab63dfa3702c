//! The adapter trait object stored by the client.

use super::{ChatCapability, TranscriptionCapability};

/// What an adapter can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub chat: bool,
    pub transcription: bool,
    pub streaming_transcription: bool,
}

impl ProviderCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(mut self) -> Self {
        self.chat = true;
        self
    }

    pub fn with_transcription(mut self) -> Self {
        self.transcription = true;
        self
    }

    pub fn with_streaming_transcription(mut self) -> Self {
        self.streaming_transcription = true;
        self
    }
}

/// A provider adapter.
///
/// Adapters are built once per provider per client and shared behind an
/// `Arc`, so they hold no per-call mutable state.
pub trait LlmClient: Send + Sync {
    /// Canonical provider id (e.g. `openai`, `google`).
    fn provider_id(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Returns `None` when the provider has no chat API.
    fn as_chat_capability(&self) -> Option<&dyn ChatCapability> {
        None
    }

    /// Returns `None` when the provider has no speech-to-text API.
    fn as_transcription_capability(&self) -> Option<&dyn TranscriptionCapability> {
        None
    }
}
