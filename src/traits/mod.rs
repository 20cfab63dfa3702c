//! Capability traits implemented by provider adapters.

mod chat;
mod client;
mod transcription;

pub use chat::ChatCapability;
pub use client::{LlmClient, ProviderCapabilities};
pub use transcription::TranscriptionCapability;
