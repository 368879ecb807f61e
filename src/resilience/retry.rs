//! Timeout and retry execution for a single logical fetch.

use crate::config::ClientConfig;
use crate::errors::{FetchError, FetchResult};
use crate::observability::{MetricsCollector, NoopMetricsCollector};
use crate::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_TIMEOUT_MS};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per logical fetch, first try included
    pub max_attempts: u32,
    /// Per-attempt deadline
    pub timeout: Duration,
    /// Backoff delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single backoff delay
    pub max_delay: Duration,
    /// Jitter fraction in [0.0, 1.0]; 0.0 matches the observed design
    pub jitter: f64,
    /// Whether 5xx responses are retried like transport failures
    pub retry_server_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            jitter: 0.0,
            retry_server_errors: false,
        }
    }
}

impl From<&ClientConfig> for RetryConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            timeout: config.timeout,
            base_delay: config.base_delay,
            max_delay: config.max_delay,
            jitter: config.jitter,
            retry_server_errors: config.retry_server_errors,
        }
    }
}

/// Executes one asynchronous operation under a per-attempt deadline with
/// bounded, exponentially backed-off retries.
///
/// Attempts are strictly sequential: attempt N+1 never starts before attempt
/// N's outcome is known. The internal deadline and a caller-held
/// [`CancellationToken`] use distinct error variants, so a deliberate abort
/// is never mistaken for a retryable timeout.
pub struct RetryExecutor {
    config: RetryConfig,
    metrics: Arc<dyn MetricsCollector>,
}

impl RetryExecutor {
    /// Create a new retry executor with the given configuration
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(NoopMetricsCollector),
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Execute the given operation with timeout and retry logic.
    ///
    /// `cancel` is the caller-level abort signal; when it fires, the current
    /// attempt (or backoff sleep) is dropped and [`FetchError::Cancelled`]
    /// propagates immediately without further attempts.
    pub async fn execute<F, Fut, T>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        f: F,
    ) -> FetchResult<T>
    where
        F: Fn() -> Fut + Send,
        Fut: Future<Output = FetchResult<T>> + Send,
        T: Send,
    {
        let mut last_error = None;

        for attempt_index in 0..self.config.max_attempts {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if attempt_index > 0 {
                let delay = self.backoff_delay(attempt_index - 1);
                debug!(operation, attempt = attempt_index + 1, ?delay, "retrying after backoff");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    _ = sleep(delay) => {}
                }
            }

            self.metrics
                .increment_counter("fetch_attempts", 1, &[("operation", operation)]);

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                attempt = timeout(self.config.timeout, f()) => match attempt {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        elapsed: self.config.timeout,
                    }),
                }
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if !self.should_retry(&e) => return Err(e),
                Err(e) => {
                    if matches!(e, FetchError::Timeout { .. }) {
                        self.metrics.increment_counter(
                            "fetch_timeouts",
                            1,
                            &[("operation", operation)],
                        );
                    }
                    warn!(operation, attempt = attempt_index + 1, error = %e, "attempt failed");
                    if attempt_index + 1 < self.config.max_attempts {
                        self.metrics.increment_counter(
                            "fetch_retries",
                            1,
                            &[("operation", operation)],
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Internal {
            message: "Retry loop exited without an outcome".to_string(),
        }))
    }

    fn should_retry(&self, error: &FetchError) -> bool {
        error.is_retryable() || (self.config.retry_server_errors && error.is_server_error())
    }

    /// Backoff delay for a retry: `base_delay * 2^attempt_index`, capped,
    /// with optional jitter.
    fn backoff_delay(&self, attempt_index: u32) -> Duration {
        let base = self.config.base_delay.as_millis() as f64
            * 2f64.powi(attempt_index.min(20) as i32);

        let jitter_range = base * self.config.jitter;
        let jitter = if jitter_range > 0.0 {
            rand::random::<f64>() * jitter_range * 2.0 - jitter_range
        } else {
            0.0
        };

        let delay_ms = (base + jitter)
            .clamp(0.0, self.config.max_delay.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }
}
