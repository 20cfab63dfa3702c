//! Built-in provider adapters.

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "deepgram")]
pub mod deepgram;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai_compatible;

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::LlmError;

/// A header value built from a credential, marked sensitive so it never
/// shows up in `Debug` output.
pub(crate) fn secret_header(
    provider: &str,
    prefix: &str,
    secret: &SecretString,
) -> Result<HeaderValue, LlmError> {
    let mut value = HeaderValue::from_str(&format!("{prefix}{}", secret.expose_secret()))
        .map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid credential for {provider}: {e}"))
        })?;
    value.set_sensitive(true);
    Ok(value)
}

/// A plain header value from configuration.
pub(crate) fn config_header(provider: &str, name: &str, value: &str) -> Result<HeaderValue, LlmError> {
    HeaderValue::from_str(value).map_err(|e| {
        LlmError::ConfigurationError(format!("Invalid {name} header for {provider}: {e}"))
    })
}

/// Read an optional string setting from `ProviderConfig::extra`.
pub(crate) fn extra_str(config: &crate::config::ResolvedProviderConfig, key: &str) -> Option<String> {
    config.extra(key).and_then(|v| v.as_str()).map(str::to_string)
}
