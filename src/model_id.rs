//! `provider:model` identifiers.

use std::fmt;

use crate::config::normalize_provider_id;
use crate::error::LlmError;

/// A parsed model identifier.
///
/// The string is split at the first `:`; the model half may itself contain
/// colons (e.g. `ollama:llama3.2:3b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    provider: String,
    model: String,
}

impl ModelId {
    /// Parse `provider:model`. The provider token is trimmed and lower-cased;
    /// the model name is kept verbatim.
    pub fn parse(s: &str) -> Result<Self, LlmError> {
        let invalid = || LlmError::InvalidModelFormat {
            model: s.to_string(),
        };
        let (provider, model) = s.split_once(':').ok_or_else(invalid)?;
        let provider = normalize_provider_id(provider);
        if provider.is_empty() || model.trim().is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

impl std::str::FromStr for ModelId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_colon() {
        let id = ModelId::parse("ollama:llama3.2:3b").unwrap();
        assert_eq!(id.provider(), "ollama");
        assert_eq!(id.model(), "llama3.2:3b");
    }

    #[test]
    fn normalizes_provider_token() {
        let id = ModelId::parse(" OpenAI :gpt-4o").unwrap();
        assert_eq!(id.provider(), "openai");
        assert_eq!(id.model(), "gpt-4o");
        assert_eq!(id.to_string(), "openai:gpt-4o");
    }

    #[test]
    fn rejects_missing_colon() {
        assert!(matches!(
            ModelId::parse("gpt-4o"),
            Err(LlmError::InvalidModelFormat { model }) if model == "gpt-4o"
        ));
    }

    #[test]
    fn rejects_empty_halves() {
        for bad in [":gpt-4o", "openai:", "  :x", "openai:  "] {
            assert!(
                matches!(ModelId::parse(bad), Err(LlmError::InvalidModelFormat { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
