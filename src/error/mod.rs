//! Error handling types for llmsuite.
//!
//! Every fallible operation in the crate returns [`LlmError`]. Router-level
//! failures (malformed model id, unknown provider, missing credentials) are
//! raised before any network access; vendor failures are forwarded verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use llmsuite::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::provider_error("openai", 404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Provider);
//! assert!(!error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
