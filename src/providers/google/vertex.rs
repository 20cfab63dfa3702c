//! Vertex AI endpoint resolution for Gemini.

use std::path::{Path, PathBuf};

use crate::config::ResolvedProviderConfig;
use crate::error::LlmError;

pub const PROJECT_ENV: &[&str] = &["GOOGLE_PROJECT_ID"];
pub const REGION_ENV: &[&str] = &["GOOGLE_REGION"];
pub const CREDENTIALS_ENV: &[&str] = &["GOOGLE_APPLICATION_CREDENTIALS"];
pub const TOKEN_ENV: &[&str] = &["GOOGLE_OAUTH_ACCESS_TOKEN"];
pub const DEFAULT_REGION: &str = "us-central1";

/// Where Vertex requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexTarget {
    pub project: String,
    pub region: String,
    /// Scheme and host, e.g. `https://us-central1-aiplatform.googleapis.com`.
    pub host: String,
}

impl VertexTarget {
    pub fn generate_content_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.host,
            self.project,
            self.region,
            model.trim_start_matches("models/")
        )
    }
}

/// `project_id` field of a service-account key file.
fn project_from_credentials(path: &Path) -> Result<Option<String>, LlmError> {
    let raw = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        LlmError::ConfigurationError(format!(
            "Credential file '{}' is not valid JSON: {e}",
            path.display()
        ))
    })?;
    Ok(json
        .get("project_id")
        .and_then(|v| v.as_str())
        .map(str::to_string))
}

/// Project named by an ambient `GOOGLE_APPLICATION_CREDENTIALS` file.
///
/// Only consulted when no API key resolves. An unreadable file means no
/// project rather than an error.
fn ambient_project(config: &ResolvedProviderConfig) -> Option<String> {
    let path = config.env.first_of(CREDENTIALS_ENV).map(PathBuf::from)?;
    match project_from_credentials(&path) {
        Ok(project) => project,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Ignoring ambient credentials file");
            None
        }
    }
}

/// Vertex target when a project is configured, `None` for the Gemini API.
///
/// Vertex mode is chosen by an explicit `project_id` (config or
/// `GOOGLE_PROJECT_ID`) or an explicit `application_credentials` path. An
/// ambient credentials file only selects Vertex when `api_key_env` yields no
/// key.
pub fn resolve(
    config: &ResolvedProviderConfig,
    api_key_env: &[&str],
) -> Result<Option<VertexTarget>, LlmError> {
    let project = match config.project_id(PROJECT_ENV) {
        Some(p) => Some(p),
        None if config.explicit.application_credentials.is_some() => {
            match config.application_credentials(&[])? {
                Some(path) => project_from_credentials(&path)?,
                None => None,
            }
        }
        None if config.api_key(api_key_env).is_none() => ambient_project(config),
        None => None,
    };
    let Some(project) = project else {
        return Ok(None);
    };

    let region = config
        .region(REGION_ENV)
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    let host = config
        .explicit
        .base_url
        .as_deref()
        .map(|b| b.trim_end_matches('/').to_string())
        .unwrap_or_else(|| format!("https://{region}-aiplatform.googleapis.com"));
    Ok(Some(VertexTarget {
        project,
        region,
        host,
    }))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::{EnvSnapshot, ProviderConfig};
    use crate::providers::google::API_KEY_ENV;
    use crate::types::HttpConfig;

    fn resolved(explicit: ProviderConfig, env: EnvSnapshot) -> ResolvedProviderConfig {
        ResolvedProviderConfig {
            provider_id: "google".into(),
            explicit,
            env,
            http: HttpConfig::default(),
        }
    }

    fn service_account(project: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type":"service_account","project_id":"{project}"}}"#).unwrap();
        file
    }

    #[test]
    fn no_project_means_gemini_api() {
        let cfg = resolved(ProviderConfig::new(), EnvSnapshot::empty());
        assert_eq!(resolve(&cfg, API_KEY_ENV).unwrap(), None);
    }

    #[test]
    fn project_from_env_with_default_region() {
        let cfg = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty().with_var("GOOGLE_PROJECT_ID", "my-proj"),
        );
        let target = resolve(&cfg, API_KEY_ENV).unwrap().unwrap();
        assert_eq!(
            target.generate_content_url("gemini-1.5-pro"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-proj/locations/us-central1/publishers/google/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn project_from_credentials_file() {
        let file = service_account("sa-proj");
        let cfg = resolved(
            ProviderConfig::new()
                .with_application_credentials(file.path())
                .with_region("europe-west4"),
            EnvSnapshot::empty(),
        );
        let target = resolve(&cfg, API_KEY_ENV).unwrap().unwrap();
        assert_eq!(target.project, "sa-proj");
        assert_eq!(target.host, "https://europe-west4-aiplatform.googleapis.com");
    }

    #[test]
    fn base_url_overrides_host() {
        let cfg = resolved(
            ProviderConfig::new()
                .with_project_id("p")
                .with_base_url("http://127.0.0.1:9000/"),
            EnvSnapshot::empty(),
        );
        let target = resolve(&cfg, API_KEY_ENV).unwrap().unwrap();
        assert_eq!(
            target.generate_content_url("models/gemini-pro"),
            "http://127.0.0.1:9000/v1/projects/p/locations/us-central1/publishers/google/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn missing_explicit_credentials_file_is_config_error() {
        let cfg = resolved(
            ProviderConfig::new().with_application_credentials("/nonexistent/key.json"),
            EnvSnapshot::empty(),
        );
        assert!(matches!(
            resolve(&cfg, API_KEY_ENV),
            Err(LlmError::ConfigurationError(_))
        ));
    }

    #[test]
    fn api_key_wins_over_dangling_ambient_credentials() {
        let cfg = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty()
                .with_var("GOOGLE_API_KEY", "AIza-test")
                .with_var("GOOGLE_APPLICATION_CREDENTIALS", "/nonexistent/adc.json"),
        );
        assert_eq!(resolve(&cfg, API_KEY_ENV).unwrap(), None);
    }

    #[test]
    fn api_key_wins_over_readable_ambient_credentials() {
        let file = service_account("sa-proj");
        let path = file.path().to_string_lossy().into_owned();
        let cfg = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty()
                .with_var("GOOGLE_API_KEY", "AIza-test")
                .with_var("GOOGLE_APPLICATION_CREDENTIALS", path.clone()),
        );
        assert_eq!(resolve(&cfg, API_KEY_ENV).unwrap(), None);

        let explicit_key = resolved(
            ProviderConfig::new().with_api_key("AIza-explicit"),
            EnvSnapshot::empty().with_var("GOOGLE_APPLICATION_CREDENTIALS", path),
        );
        assert_eq!(resolve(&explicit_key, API_KEY_ENV).unwrap(), None);
    }

    #[test]
    fn ambient_credentials_select_vertex_without_api_key() {
        let file = service_account("sa-proj");
        let cfg = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty().with_var(
                "GOOGLE_APPLICATION_CREDENTIALS",
                file.path().to_string_lossy().into_owned(),
            ),
        );
        let target = resolve(&cfg, API_KEY_ENV).unwrap().unwrap();
        assert_eq!(target.project, "sa-proj");
    }

    #[test]
    fn dangling_ambient_credentials_without_api_key_is_not_an_error() {
        let cfg = resolved(
            ProviderConfig::new(),
            EnvSnapshot::empty().with_var("GOOGLE_APPLICATION_CREDENTIALS", "/nonexistent/adc.json"),
        );
        assert_eq!(resolve(&cfg, API_KEY_ENV).unwrap(), None);
    }
}
