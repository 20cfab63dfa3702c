//! Provider factory trait

use std::sync::Arc;

use crate::config::ResolvedProviderConfig;
use crate::error::LlmError;
use crate::retry_api::RetryOptions;
use crate::traits::LlmClient;

/// Everything a factory needs to build an adapter.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Explicit configuration merged with the environment snapshot.
    pub config: ResolvedProviderConfig,
    /// Shared HTTP client built from the client's `HttpConfig`.
    pub http_client: reqwest::Client,
    pub retry_options: Option<RetryOptions>,
}

impl BuildContext {
    pub fn provider_id(&self) -> &str {
        &self.config.provider_id
    }
}

/// Builds one adapter per provider.
///
/// `create` runs at most once per provider per client (until the provider is
/// reconfigured). It must not perform network I/O; missing credentials are
/// reported here as [`LlmError::ConfigurationError`].
pub trait ProviderFactory: Send + Sync {
    /// Environment variables this provider may fall back to. They are
    /// captured once when the client is built.
    fn env_keys(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn create(&self, ctx: &BuildContext) -> Result<Arc<dyn LlmClient>, LlmError>;
}
