//! Provider factory implementations
//!
//! Each built-in provider implements [`ProviderFactory`] to create its adapter.

// unused when every provider feature is off
#![allow(unused_imports)]

use std::sync::Arc;

use super::{BuildContext, ProviderFactory, ProviderRegistry};
use crate::error::LlmError;
use crate::traits::LlmClient;

/// Factory for one OpenAI-compatible vendor
#[cfg(feature = "openai")]
pub struct OpenAiCompatibleProviderFactory {
    spec: crate::providers::openai_compatible::spec::CompatProviderSpec,
}

#[cfg(feature = "openai")]
impl OpenAiCompatibleProviderFactory {
    pub fn new(spec: crate::providers::openai_compatible::spec::CompatProviderSpec) -> Self {
        Self { spec }
    }
}

#[cfg(feature = "openai")]
impl ProviderFactory for OpenAiCompatibleProviderFactory {
    fn env_keys(&self) -> Vec<&'static str> {
        self.spec.env_keys()
    }

    fn create(&self, ctx: &BuildContext) -> Result<Arc<dyn LlmClient>, LlmError> {
        let client = crate::providers::openai_compatible::OpenAiCompatibleClient::new(self.spec, ctx)?;
        Ok(Arc::new(client))
    }
}

/// Anthropic provider factory
#[cfg(feature = "anthropic")]
pub struct AnthropicProviderFactory;

#[cfg(feature = "anthropic")]
impl ProviderFactory for AnthropicProviderFactory {
    fn env_keys(&self) -> Vec<&'static str> {
        use crate::providers::anthropic::{API_KEY_ENV, BASE_URL_ENV};
        [API_KEY_ENV, BASE_URL_ENV].concat()
    }

    fn create(&self, ctx: &BuildContext) -> Result<Arc<dyn LlmClient>, LlmError> {
        let client = crate::providers::anthropic::AnthropicClient::new(ctx)?;
        Ok(Arc::new(client))
    }
}

/// Google Gemini / Vertex provider factory
#[cfg(feature = "google")]
pub struct GoogleProviderFactory;

#[cfg(feature = "google")]
impl ProviderFactory for GoogleProviderFactory {
    fn env_keys(&self) -> Vec<&'static str> {
        crate::providers::google::env_keys()
    }

    fn create(&self, ctx: &BuildContext) -> Result<Arc<dyn LlmClient>, LlmError> {
        let client = crate::providers::google::GoogleClient::new(ctx)?;
        Ok(Arc::new(client))
    }
}

/// Deepgram provider factory
#[cfg(feature = "deepgram")]
pub struct DeepgramProviderFactory;

#[cfg(feature = "deepgram")]
impl ProviderFactory for DeepgramProviderFactory {
    fn env_keys(&self) -> Vec<&'static str> {
        use crate::providers::deepgram::{API_KEY_ENV, BASE_URL_ENV};
        [API_KEY_ENV, BASE_URL_ENV].concat()
    }

    fn create(&self, ctx: &BuildContext) -> Result<Arc<dyn LlmClient>, LlmError> {
        let client = crate::providers::deepgram::DeepgramClient::new(ctx)?;
        Ok(Arc::new(client))
    }
}

/// Register every provider compiled into this build.
pub(crate) fn register_builtin(registry: &mut ProviderRegistry) {
    #[cfg(feature = "openai")]
    for spec in crate::providers::openai_compatible::spec::ALL {
        registry.register(spec.id, Arc::new(OpenAiCompatibleProviderFactory::new(*spec)));
    }

    #[cfg(feature = "anthropic")]
    registry.register("anthropic", Arc::new(AnthropicProviderFactory));

    #[cfg(feature = "google")]
    {
        registry.register("google", Arc::new(GoogleProviderFactory));
        for alias in ["google-rest", "google_rest", "gemini"] {
            if let Err(e) = registry.add_alias(alias, "google") {
                tracing::warn!(alias, error = %e, "Failed to register provider alias");
            }
        }
    }

    #[cfg(feature = "deepgram")]
    registry.register("deepgram", Arc::new(DeepgramProviderFactory));

    tracing::trace!(providers = ?registry.provider_ids(), "Registered built-in providers");
}
