//! Provider registry
//!
//! Maps provider ids (and aliases) to factories. Lookup never touches the
//! network; an unknown id fails with [`LlmError::ProviderNotFound`].

pub mod factories;
pub mod factory;

pub use factory::{BuildContext, ProviderFactory};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::normalize_provider_id;
use crate::error::LlmError;

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, Arc<dyn ProviderFactory>>,
    aliases: HashMap<String, String>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_ids())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every provider compiled in.
    pub fn with_builtin_providers() -> Self {
        let mut registry = Self::new();
        factories::register_builtin(&mut registry);
        registry
    }

    /// Register (or replace) a factory under a canonical id.
    pub fn register(&mut self, id: impl AsRef<str>, factory: Arc<dyn ProviderFactory>) {
        let id = normalize_provider_id(id.as_ref());
        self.aliases.remove(&id);
        self.factories.insert(id, factory);
    }

    /// Make `alias` resolve to `target`. The target must already be registered.
    pub fn add_alias(
        &mut self,
        alias: impl AsRef<str>,
        target: impl AsRef<str>,
    ) -> Result<(), LlmError> {
        let alias = normalize_provider_id(alias.as_ref());
        let target = self.canonical_id(target.as_ref())?;
        if self.factories.contains_key(&alias) {
            return Err(LlmError::ConfigurationError(format!(
                "Alias '{alias}' collides with a registered provider"
            )));
        }
        self.aliases.insert(alias, target);
        Ok(())
    }

    /// Resolve a token (alias or id) to its canonical provider id.
    pub fn canonical_id(&self, token: &str) -> Result<String, LlmError> {
        let token = normalize_provider_id(token);
        let id = self.aliases.get(&token).cloned().unwrap_or(token);
        if self.factories.contains_key(&id) {
            Ok(id)
        } else {
            Err(LlmError::ProviderNotFound {
                provider: id,
                available: self.provider_ids(),
            })
        }
    }

    /// Resolve a token to `(canonical id, factory)`.
    pub fn resolve(&self, token: &str) -> Result<(String, Arc<dyn ProviderFactory>), LlmError> {
        let id = self.canonical_id(token)?;
        let factory = self
            .factories
            .get(&id)
            .cloned()
            .ok_or_else(|| LlmError::ProviderNotFound {
                provider: id.clone(),
                available: self.provider_ids(),
            })?;
        Ok((id, factory))
    }

    /// Registered canonical ids, sorted.
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every environment variable any registered factory may read.
    pub fn env_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .factories
            .values()
            .flat_map(|f| f.env_keys())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}
