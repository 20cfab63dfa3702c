//! Core error types.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Unified error type for every client, router, adapter and orchestrator call.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// A required credential or option is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The model identifier is not of the form `provider:model`.
    #[error("Invalid model format: '{model}' (expected 'provider:model')")]
    InvalidModelFormat { model: String },

    /// No adapter is registered for the provider token.
    #[error("Provider not found: '{provider}'. Available providers: {available:?}")]
    ProviderNotFound {
        provider: String,
        available: Vec<String>,
    },

    /// The model asked for a tool that is not in the registered set.
    #[error("Tool not found: '{0}'")]
    ToolNotFound(String),

    /// A tool failed while executing in strict mode.
    #[error("Tool '{name}' failed: {message}")]
    ToolExecutionError { name: String, message: String },

    /// The vendor rejected the request or returned a non-success status.
    #[error("{provider} API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    ProviderError {
        provider: String,
        status: Option<u16>,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// A vendor payload did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A streaming response broke mid-way.
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Local file access failed.
    #[error("IO error: {0}")]
    IoError(String),

    /// A request parameter is invalid for the target provider.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The provider does not support the requested operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised by the router or client configuration, before any request.
    Configuration,
    /// Raised by the vendor API.
    Provider,
    /// Transport or stream failures.
    Network,
    /// Tool lookup or execution failures.
    Tool,
    /// Malformed payloads and invalid parameters.
    Validation,
    /// Operation not available for the provider.
    Unsupported,
}

impl LlmError {
    /// Build a [`LlmError::ProviderError`] from a status and message.
    pub fn provider_error(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            status: Some(status),
            message: message.into(),
            details: None,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ProviderError { status, .. } => *status,
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_)
            | Self::InvalidModelFormat { .. }
            | Self::ProviderNotFound { .. } => ErrorCategory::Configuration,
            Self::ProviderError { .. } => ErrorCategory::Provider,
            Self::HttpError(_) | Self::StreamError(_) => ErrorCategory::Network,
            Self::ToolNotFound(_) | Self::ToolExecutionError { .. } => ErrorCategory::Tool,
            Self::JsonError(_) | Self::ParseError(_) | Self::InvalidParameter(_) => {
                ErrorCategory::Validation
            }
            Self::IoError(_) => ErrorCategory::Configuration,
            Self::UnsupportedOperation(_) => ErrorCategory::Unsupported,
        }
    }

    /// Whether an opt-in retry policy may resend the request.
    ///
    /// Rate limits, server errors and transport failures are retryable;
    /// everything else is surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderError {
                status: Some(status),
                ..
            } => *status == 408 || *status == 429 || (500..=599).contains(status),
            Self::HttpError(_) => true,
            _ => false,
        }
    }

    /// Whether the error was raised before any network access.
    pub fn is_pre_request(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}
