//! Error types for the listings client.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Main error type for the listings client.
///
/// Covers every failure mode of the fetch path with enough context for the
/// retry executor to classify an error and for UI layers to pick a message.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Configuration error (invalid settings, malformed base URL)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration issue
        message: String,
    },

    /// The per-attempt deadline expired before the operation settled.
    ///
    /// Raised by the internal attempt timer, never by the caller. Distinct
    /// from [`FetchError::Cancelled`] so retry logic can retry timeouts while
    /// honoring deliberate aborts.
    #[error("Request timed out after {elapsed:?}")]
    Timeout {
        /// The deadline that was exceeded
        elapsed: Duration,
    },

    /// Transport-level failure (DNS, connection refused, connection reset)
    #[error("Network error: {message}")]
    Network {
        /// Description of the transport failure
        message: String,
    },

    /// Non-2xx HTTP response with its structured error payload
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message parsed from the `{error, message}` body, or the raw body
        message: String,
    },

    /// A 2xx response whose body could not be interpreted as JSON
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the content-type or deserialization failure
        message: String,
    },

    /// Admission control denied the request
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        /// Time until the current window resets
        retry_after: Option<Duration>,
    },

    /// The caller aborted the operation (e.g. consumer unmounted).
    ///
    /// Propagates immediately; the executor never retries a deliberate abort.
    #[error("Operation cancelled by caller")]
    Cancelled,

    /// Internal error (unexpected conditions, library bugs)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal issue
        message: String,
    },
}

impl FetchError {
    /// Returns true if this error is retryable with exponential backoff.
    ///
    /// Only transport failures and internal deadline expiries qualify. Non-2xx
    /// responses are not retried by default; see
    /// [`RetryConfig::retry_server_errors`](crate::resilience::RetryConfig)
    /// for the opt-in 5xx policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Network { .. } | FetchError::Timeout { .. }
        )
    }

    /// Returns true for a 5xx HTTP response.
    pub fn is_server_error(&self) -> bool {
        matches!(self, FetchError::Http { status, .. } if (500..600).contains(status))
    }

    /// Returns the retry-after duration if the error carries one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimitExceeded { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Human-readable message for list views, selected by failure kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "request timed out",
            FetchError::Network { .. } => "network error",
            _ => "failed to load",
        }
    }
}

// Conversions from common error types
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network {
                message: format!("Request timed out: {}", err),
            }
        } else if err.is_connect() {
            FetchError::Network {
                message: format!("Connection failed: {}", err),
            }
        } else {
            FetchError::Network {
                message: format!("Network error: {}", err),
            }
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse {
            message: format!("JSON deserialization error: {}", err),
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
