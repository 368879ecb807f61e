//! Configuration types for the listings client.

use crate::errors::{FetchError, FetchResult};
use crate::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
use std::time::Duration;

/// Configuration for the listings client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the listings API
    pub base_url: String,
    /// Per-attempt deadline
    pub timeout: Duration,
    /// Total number of attempts per logical fetch (first try included)
    pub max_attempts: u32,
    /// Backoff delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single backoff delay
    pub max_delay: Duration,
    /// Jitter fraction applied to backoff delays.
    ///
    /// The surrounding product runs without jitter; 0.0 preserves that
    /// behavior exactly. Values in (0.0, 1.0] randomize each delay by up to
    /// that fraction in either direction.
    pub jitter: f64,
    /// Whether 5xx responses are retried like transport failures.
    ///
    /// Off by default: a non-2xx is normally parsed and raised immediately.
    pub retry_server_errors: bool,
    /// Append a cache-busting `_ts` query parameter to every request
    pub cache_bust: bool,
}

impl ClientConfig {
    /// Creates a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Creates a configuration from environment variables
    pub fn from_env() -> FetchResult<Self> {
        let base_url =
            std::env::var("LISTINGS_API_BASE_URL").map_err(|_| FetchError::Configuration {
                message: "LISTINGS_API_BASE_URL environment variable not set".to_string(),
            })?;

        let timeout_ms = std::env::var("LISTINGS_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let max_attempts = std::env::var("LISTINGS_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        Self::builder()
            .base_url(base_url)
            .timeout(Duration::from_millis(timeout_ms))
            .max_attempts(max_attempts)
            .build()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_attempts: Option<u32>,
    base_delay: Option<Duration>,
    max_delay: Option<Duration>,
    jitter: Option<f64>,
    retry_server_errors: Option<bool>,
    cache_bust: Option<bool>,
}

impl ClientConfigBuilder {
    /// Sets the API base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-attempt deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the total number of attempts per fetch
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Sets the initial backoff delay
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = Some(base_delay);
        self
    }

    /// Sets the backoff delay cap
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Sets the backoff jitter fraction
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Enables or disables retrying 5xx responses
    pub fn retry_server_errors(mut self, retry: bool) -> Self {
        self.retry_server_errors = Some(retry);
        self
    }

    /// Enables or disables the cache-busting query parameter
    pub fn cache_bust(mut self, cache_bust: bool) -> Self {
        self.cache_bust = Some(cache_bust);
        self
    }

    /// Builds the configuration
    pub fn build(self) -> FetchResult<ClientConfig> {
        let base_url = self.base_url.ok_or_else(|| FetchError::Configuration {
            message: "Base URL is required".to_string(),
        })?;

        url::Url::parse(&base_url)?;

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(FetchError::Configuration {
                message: "max_attempts must be at least 1".to_string(),
            });
        }

        let jitter = self.jitter.unwrap_or(0.0);
        if !(0.0..=1.0).contains(&jitter) {
            return Err(FetchError::Configuration {
                message: "jitter must be within [0.0, 1.0]".to_string(),
            });
        }

        Ok(ClientConfig {
            base_url,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            max_attempts,
            base_delay: self
                .base_delay
                .unwrap_or(Duration::from_millis(DEFAULT_BASE_DELAY_MS)),
            max_delay: self
                .max_delay
                .unwrap_or(Duration::from_millis(DEFAULT_MAX_DELAY_MS)),
            jitter,
            retry_server_errors: self.retry_server_errors.unwrap_or(false),
            cache_bust: self.cache_bust.unwrap_or(false),
        })
    }
}
