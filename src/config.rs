//! Client and provider configuration.
//!
//! Configuration is resolved once, when the [`Client`](crate::Client) is
//! built: explicit values win, otherwise the value is taken from an
//! [`EnvSnapshot`] captured at construction time. Nothing re-reads the process
//! environment afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::LlmError;
use crate::observability::mask_sensitive_value;
use crate::types::HttpConfig;

/// Options recognized for a single provider.
///
/// Which fields matter depends on the provider; unknown providers can read
/// arbitrary settings from `extra`.
#[derive(Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Path to a credential file (e.g. a Google service-account JSON).
    #[serde(default)]
    pub application_credentials: Option<PathBuf>,
    /// Endpoint override, mostly useful for proxies and tests.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field(
                "api_key",
                &self
                    .api_key
                    .as_ref()
                    .map(|k| mask_sensitive_value(k.expose_secret())),
            )
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("application_credentials", &self.application_credentials)
            .field("base_url", &self.base_url)
            .field("extra", &self.extra)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_application_credentials(mut self, path: impl Into<PathBuf>) -> Self {
        self.application_credentials = Some(path.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Per-provider configuration plus transport settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub http: HttpConfig,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a provider entry. Provider ids are normalized.
    pub fn provider(mut self, id: impl AsRef<str>, config: ProviderConfig) -> Self {
        self.providers
            .insert(normalize_provider_id(id.as_ref()), config);
        self
    }

    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Parse a JSON document of the form
    /// `{"providers": {"openai": {"api_key": "..."}}, "http": {"timeout": 30}}`.
    pub fn from_json_str(json: &str) -> Result<Self, LlmError> {
        let mut config: ClientConfig = serde_json::from_str(json)
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid client config: {e}")))?;
        config.providers = config
            .providers
            .into_iter()
            .map(|(k, v)| (normalize_provider_id(&k), v))
            .collect();
        Ok(config)
    }
}

/// Normalize a provider token: trimmed and lower-cased.
pub fn normalize_provider_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

/// Environment variables captured once at client construction.
#[derive(Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl std::fmt::Debug for EnvSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("EnvSnapshot").field("keys", &keys).finish()
    }
}

impl EnvSnapshot {
    /// An empty snapshot: no environment fallback at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the listed variables from the process environment.
    pub fn capture<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = keys
            .into_iter()
            .filter_map(|k| {
                let k = k.as_ref();
                std::env::var(k)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (k.to_string(), v))
            })
            .collect();
        Self { vars }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// First variable present among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }
}

/// Configuration handed to a provider factory: explicit values merged with
/// the environment snapshot.
#[derive(Debug, Clone)]
pub struct ResolvedProviderConfig {
    pub provider_id: String,
    pub explicit: ProviderConfig,
    pub env: EnvSnapshot,
    pub http: HttpConfig,
}

impl ResolvedProviderConfig {
    /// Explicit `api_key`, else the first of `env_keys`, else
    /// `ConfigurationError`.
    pub fn require_api_key(&self, env_keys: &[&str]) -> Result<SecretString, LlmError> {
        self.api_key(env_keys).ok_or_else(|| {
            LlmError::ConfigurationError(format!(
                "{} is required for provider '{}'. Set it in the environment or the provider config.",
                env_keys.join(" or "),
                self.provider_id
            ))
        })
    }

    /// Explicit `api_key`, else the first of `env_keys`.
    pub fn api_key(&self, env_keys: &[&str]) -> Option<SecretString> {
        if let Some(key) = &self.explicit.api_key {
            return Some(key.clone());
        }
        self.env
            .first_of(env_keys)
            .map(|v| SecretString::from(v.to_string()))
    }

    /// Explicit `base_url`, else the first of `env_keys`, else `default`.
    pub fn base_url(&self, env_keys: &[&str], default: &str) -> String {
        self.explicit
            .base_url
            .clone()
            .or_else(|| self.env.first_of(env_keys).map(str::to_string))
            .unwrap_or_else(|| default.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn project_id(&self, env_keys: &[&str]) -> Option<String> {
        self.explicit
            .project_id
            .clone()
            .or_else(|| self.env.first_of(env_keys).map(str::to_string))
    }

    pub fn region(&self, env_keys: &[&str]) -> Option<String> {
        self.explicit
            .region
            .clone()
            .or_else(|| self.env.first_of(env_keys).map(str::to_string))
    }

    /// Explicit `application_credentials`, else the first of `env_keys`.
    ///
    /// The file must exist; a dangling path is a configuration error.
    pub fn application_credentials(
        &self,
        env_keys: &[&str],
    ) -> Result<Option<PathBuf>, LlmError> {
        let path = self
            .explicit
            .application_credentials
            .clone()
            .or_else(|| self.env.first_of(env_keys).map(PathBuf::from));
        match path {
            Some(p) if !Path::new(&p).is_file() => Err(LlmError::ConfigurationError(format!(
                "Credential file '{}' for provider '{}' does not exist",
                p.display(),
                self.provider_id
            ))),
            other => Ok(other),
        }
    }

    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.explicit.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(explicit: ProviderConfig, env: EnvSnapshot) -> ResolvedProviderConfig {
        ResolvedProviderConfig {
            provider_id: "openai".into(),
            explicit,
            env,
            http: HttpConfig::default(),
        }
    }

    #[test]
    fn explicit_key_wins_over_env() {
        let r = resolved(
            ProviderConfig::new().with_api_key("explicit"),
            EnvSnapshot::empty().with_var("OPENAI_API_KEY", "from-env"),
        );
        let key = r.require_api_key(&["OPENAI_API_KEY"]).unwrap();
        assert_eq!(key.expose_secret(), "explicit");
    }

    #[test]
    fn env_key_is_fallback() {
        let r = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty().with_var("OPENAI_API_KEY", "from-env"),
        );
        let key = r.require_api_key(&["OPENAI_API_KEY"]).unwrap();
        assert_eq!(key.expose_secret(), "from-env");
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let r = resolved(ProviderConfig::new(), EnvSnapshot::empty());
        let err = r.require_api_key(&["OPENAI_API_KEY"]).unwrap_err();
        match err {
            LlmError::ConfigurationError(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let r = resolved(
            ProviderConfig::new().with_base_url("http://localhost:8080/v1/"),
            EnvSnapshot::empty(),
        );
        assert_eq!(r.base_url(&[], "https://x"), "http://localhost:8080/v1");
        let r = resolved(ProviderConfig::new(), EnvSnapshot::empty());
        assert_eq!(r.base_url(&[], "https://x/"), "https://x");
    }

    #[test]
    fn dangling_credentials_path_is_rejected() {
        let r = resolved(
            ProviderConfig::new().with_application_credentials("/no/such/creds.json"),
            EnvSnapshot::empty(),
        );
        assert!(matches!(
            r.application_credentials(&["GOOGLE_APPLICATION_CREDENTIALS"]),
            Err(LlmError::ConfigurationError(_))
        ));
    }

    #[test]
    fn credentials_path_from_env() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let r = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty().with_var(
                "GOOGLE_APPLICATION_CREDENTIALS",
                file.path().to_string_lossy().to_string(),
            ),
        );
        let path = r
            .application_credentials(&["GOOGLE_APPLICATION_CREDENTIALS"])
            .unwrap();
        assert_eq!(path.as_deref(), Some(file.path()));
    }

    #[test]
    fn client_config_from_json_normalizes_ids() {
        let cfg = ClientConfig::from_json_str(
            r#"{"providers": {"OpenAI": {"api_key": "sk-test", "extra": {"organization": "org-1"}}},
                "http": {"timeout": 10}}"#,
        )
        .unwrap();
        let openai = cfg.providers.get("openai").expect("normalized id");
        assert_eq!(
            openai.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("sk-test".to_string())
        );
        assert_eq!(openai.extra["organization"], "org-1");
        assert_eq!(cfg.http.timeout, Some(std::time::Duration::from_secs(10)));
    }

    #[test]
    fn debug_output_masks_api_key() {
        let cfg = ProviderConfig::new().with_api_key("sk-abcdefghijklmnopqrstuvwxyz");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("abcdefghijklmnopqrstuvwxyz"));
    }

    #[test]
    fn capture_skips_blank_values() {
        let snap = EnvSnapshot::capture(["LLMSUITE_TEST_SURELY_UNSET_VAR"]);
        assert!(snap.get("LLMSUITE_TEST_SURELY_UNSET_VAR").is_none());
    }
}
