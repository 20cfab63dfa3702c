//! Tracing subscriber initialization.
//!
//! ```rust,ignore
//! use llmsuite::observability::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let _guard = init_subscriber(
//!     SubscriberConfig::builder()
//!         .log_level(tracing::Level::DEBUG)
//!         .output_format(OutputFormat::Json)
//!         .build(),
//! )?;
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::LlmError;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Configuration for [`init_subscriber`]
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// When set, logs go to this file through a non-blocking writer instead of stdout.
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Verbose text output on stdout.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        let level = level_name(self.log_level);
        EnvFilter::new(format!("llmsuite={level}"))
    }
}

/// Builder for `SubscriberConfig`
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from `trace|debug|info|warn|error`.
    pub fn log_level_str(mut self, level: &str) -> Result<Self, LlmError> {
        self.log_level = Some(parse_level(level)?);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            log_file: self.log_file,
        }
    }
}

fn level_name(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

fn parse_level(level: &str) -> Result<tracing::Level, LlmError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        other => Err(LlmError::ConfigurationError(format!(
            "Invalid log level: {other}. Valid options: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_format(format: &str) -> Result<OutputFormat, LlmError> {
    match format.trim().to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(LlmError::ConfigurationError(format!(
            "Invalid log format: {other}. Valid options: text, json"
        ))),
    }
}

/// Install a global subscriber.
///
/// Returns the file writer guard when `log_file` is set; keep it alive for
/// the lifetime of the program. An already-installed global subscriber is
/// not an error.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, LlmError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }
    let filter = config.filter();

    let (result, guard) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path.file_name().ok_or_else(|| {
                LlmError::ConfigurationError(format!(
                    "Log file path '{}' has no file name",
                    path.display()
                ))
            })?;
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer);
            let result = match config.output_format {
                OutputFormat::Json => builder.json().try_init(),
                OutputFormat::Text => builder.try_init(),
            };
            (result, Some(guard))
        }
        None => {
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true);
            let result = match config.output_format {
                OutputFormat::Json => builder.json().try_init(),
                OutputFormat::Text => builder.try_init(),
            };
            (result, None)
        }
    };

    match result {
        Ok(()) => Ok(guard),
        Err(e) => Err(LlmError::ConfigurationError(format!(
            "Failed to initialize tracing: {e}"
        ))),
    }
}

/// Install a subscriber configured from the environment.
///
/// - `LLMSUITE_LOG_LEVEL`: trace, debug, info, warn, error
/// - `LLMSUITE_LOG_FORMAT`: text, json
/// - `LLMSUITE_LOG_FILE`: path of a log file
pub fn init_from_env() -> Result<Option<WorkerGuard>, LlmError> {
    init_subscriber(config_from_vars(|k| std::env::var(k).ok())?)
}

fn config_from_vars(
    get: impl Fn(&str) -> Option<String>,
) -> Result<SubscriberConfig, LlmError> {
    let mut builder = SubscriberConfig::builder();
    if let Some(level) = get("LLMSUITE_LOG_LEVEL") {
        builder = builder.log_level_str(&level)?;
    }
    if let Some(format) = get("LLMSUITE_LOG_FORMAT") {
        builder = builder.output_format(parse_format(&format)?);
    }
    if let Some(file) = get("LLMSUITE_LOG_FILE") {
        builder = builder.log_file(file);
    }
    Ok(builder.build())
}
