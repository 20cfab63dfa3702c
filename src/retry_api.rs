//! Opt-in retry for provider calls.
//!
//! Retries are disabled unless the client is built with [`RetryOptions`].
//! Only errors for which [`LlmError::is_retryable`] holds are retried.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::error::LlmError;

/// Exponential backoff settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOptions {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// Give up once this much time has elapsed across attempts.
    pub max_elapsed_time: Option<Duration>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(1000),
            max_interval: Duration::from_secs(60),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(300)),
        }
    }
}

impl RetryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_elapsed_time(mut self, elapsed: Option<Duration>) -> Self {
        self.max_elapsed_time = elapsed;
        self
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent.
pub async fn retry_with<F, Fut, T>(operation: F, options: &RetryOptions) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(options.initial_interval)
        .with_max_interval(options.max_interval)
        .with_multiplier(options.multiplier)
        .with_max_elapsed_time(options.max_elapsed_time)
        .build();
    let attempts = Arc::new(AtomicU32::new(0));
    let max_attempts = options.max_attempts.max(1);

    backoff::future::retry(policy, || {
        let attempts = attempts.clone();
        let fut = operation();
        async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match fut.await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(attempt, max_attempts, error = %e, "Retrying provider call");
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        }
    })
    .await
}
