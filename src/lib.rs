//! # llmsuite
//!
//! One client for many LLM vendors. Models are addressed as
//! `provider:model` (`openai:gpt-4o`, `anthropic:claude-3-5-sonnet-latest`,
//! `google:gemini-1.5-flash`); the client routes each call to a lazily built
//! provider adapter and normalizes requests and responses.
//!
//! Features:
//! - Chat completions with a shared request/response shape
//! - Automatic tool calling bounded by `max_turns`
//! - Speech-to-text, with incremental streaming where the vendor offers it
//! - Credentials from explicit config or a one-time environment snapshot
//!
//! ```rust,ignore
//! use llmsuite::prelude::*;
//!
//! let client = Client::new(ClientConfig::new())?;
//! let resp = client
//!     .chat()
//!     .completions()
//!     .create(ChatCompletionRequest::new(
//!         "anthropic:claude-3-5-sonnet-latest",
//!         vec![ChatMessage::user("Say hi")],
//!     ))
//!     .await?;
//! println!("{}", resp.content_text().unwrap_or_default());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executors;
pub mod model_id;
pub mod observability;
pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod retry_api;
pub mod tools;
pub mod traits;
pub mod transformers;
pub mod types;
pub mod utils;

pub use client::{ChatCompletionRequest, Client, ClientBuilder};
pub use config::{ClientConfig, EnvSnapshot, ProviderConfig};
pub use error::LlmError;
pub use model_id::ModelId;
pub use orchestrator::{ToolExecutionMode, ToolResolver};
pub use registry::{BuildContext, ProviderFactory, ProviderRegistry};
pub use retry_api::RetryOptions;
pub use tools::{FunctionTool, ParamType, ToolParam, Tools};
pub use traits::{ChatCapability, LlmClient, ProviderCapabilities, TranscriptionCapability};

/// Common imports.
pub mod prelude {
    pub use crate::client::{ChatCompletionRequest, Client};
    pub use crate::config::{ClientConfig, ProviderConfig};
    pub use crate::error::LlmError;
    pub use crate::orchestrator::ToolExecutionMode;
    pub use crate::tools::{FunctionTool, ParamType, ToolParam, Tools};
    pub use crate::types::{
        AudioInput, ChatCompletionResponse, ChatMessage, FinishReason, MessageRole, Tool,
        TranscriptionRequest, TranscriptionResult,
    };
}

static_assertions::assert_impl_all!(Client: Send, Sync);
static_assertions::assert_impl_all!(ProviderRegistry: Send, Sync);
