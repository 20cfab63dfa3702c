//! Generic HTTP executors driven by provider transformers.

pub mod audio;
pub mod chat;
pub mod errors;

pub use audio::{AudioExecutor, HttpAudioExecutor};
pub use chat::{ChatExecutor, HttpChatExecutor};

use reqwest::header::HeaderMap;

use crate::error::LlmError;

/// Header builder hook shared by executors.
pub type HeaderBuilder = Box<dyn Fn() -> Result<HeaderMap, LlmError> + Send + Sync>;
