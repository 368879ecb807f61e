//! Keyed fixed-window admission control.
//!
//! A deliberate fixed-window counter, not a sliding log or token bucket: a
//! burst straddling a window boundary can briefly admit up to twice the
//! nominal rate. That imprecision is part of the contract.

use crate::observability::{MetricsCollector, NoopMetricsCollector};
use crate::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use http::HeaderMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for the fixed-window limiter
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per key per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: Duration::from_millis(DEFAULT_WINDOW_MS),
        }
    }
}

/// Outcome of one admission check.
///
/// A denial is a value, not an error; middleware converts it into a 429 and
/// the headers below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Configured per-window limit
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window resets
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Write the standard rate-limit response headers.
    ///
    /// `X-RateLimit-Reset` carries unix seconds.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        let entries = [
            ("x-ratelimit-limit", self.limit.to_string()),
            ("x-ratelimit-remaining", self.remaining.to_string()),
            ("x-ratelimit-reset", self.reset_at.timestamp().to_string()),
        ];
        for (name, value) in entries {
            if let Ok(value) = value.parse() {
                headers.insert(name, value);
            }
        }
    }

    /// Time until the window resets, measured from `now`.
    pub fn retry_after(&self, now: DateTime<Utc>) -> Duration {
        (self.reset_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug)]
struct WindowRecord {
    count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Fixed-window rate limiter keyed by client identity.
///
/// An explicitly constructed value with its own record store; tests and
/// independent endpoints instantiate their own limiters instead of sharing
/// process-wide state. The read-modify-write per key is one synchronous
/// critical section.
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, WindowRecord>>,
    metrics: Arc<dyn MetricsCollector>,
}

impl FixedWindowLimiter {
    /// Create a new limiter with the given configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
            metrics: Arc::new(NoopMetricsCollector),
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Decide whether to admit one request for `key` at time `now`.
    ///
    /// An absent or expired record is reset to a fresh window before the
    /// count is incremented, so the first request after a rollover observes
    /// `count = 1`. Never fails.
    pub fn admit(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let window = ChronoDuration::from_std(self.config.window)
            .unwrap_or_else(|_| ChronoDuration::milliseconds(DEFAULT_WINDOW_MS as i64));

        let mut windows = self.windows.lock();
        let record = windows
            .entry(key.to_string())
            .or_insert_with(|| WindowRecord {
                count: 0,
                window_reset_at: now + window,
            });

        if now > record.window_reset_at {
            record.count = 0;
            record.window_reset_at = now + window;
        }

        record.count += 1;
        let allowed = record.count <= self.config.max_requests;

        if !allowed {
            debug!(key, count = record.count, "admission denied");
            self.metrics
                .increment_counter("rate_limit_denied", 1, &[("key", key)]);
        }

        RateLimitDecision {
            allowed,
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(record.count),
            reset_at: record.window_reset_at,
        }
    }

    /// Remove records whose window expired more than one full window ago.
    ///
    /// Bounds the key map in long-running processes; callers schedule this
    /// periodically. Returns the number of records removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let grace = ChronoDuration::from_std(self.config.window)
            .unwrap_or_else(|_| ChronoDuration::milliseconds(DEFAULT_WINDOW_MS as i64));

        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, record| now <= record.window_reset_at + grace);
        before - windows.len()
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    /// Returns true when no keys are tracked
    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn limiter(max_requests: u32, window_ms: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_millis(window_ms),
        })
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn test_admits_up_to_limit_then_denies() {
        let limiter = limiter(5, 1000);
        let now = at(0);

        for i in 0..5 {
            let decision = limiter.admit("10.0.0.1", now);
            assert!(decision.allowed, "request {} should be admitted", i + 1);
        }

        let sixth = limiter.admit("10.0.0.1", now);
        assert!(!sixth.allowed);
        assert_eq!(sixth.remaining, 0);
    }

    #[test]
    fn test_window_rollover_resets_count() {
        let limiter = limiter(5, 1000);

        for _ in 0..6 {
            limiter.admit("10.0.0.1", at(0));
        }

        let after_window = limiter.admit("10.0.0.1", at(2));
        assert!(after_window.allowed);
        // Count reset to 0 then incremented: one request consumed.
        assert_eq!(after_window.remaining, 4);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 1000);
        let now = at(0);

        assert!(limiter.admit("10.0.0.1", now).allowed);
        assert!(!limiter.admit("10.0.0.1", now).allowed);
        assert!(limiter.admit("10.0.0.2", now).allowed);
    }

    #[test]
    fn test_remaining_decrements_within_window() {
        let limiter = limiter(3, 1000);
        let now = at(0);

        assert_eq!(limiter.admit("k", now).remaining, 2);
        assert_eq!(limiter.admit("k", now).remaining, 1);
        assert_eq!(limiter.admit("k", now).remaining, 0);
    }

    #[test]
    fn test_decision_headers() {
        let limiter = limiter(100, 60_000);
        let now = at(0);
        let decision = limiter.admit("k", now);

        let mut headers = HeaderMap::new();
        decision.apply_headers(&mut headers);

        assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "100");
        assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "99");
        assert_eq!(
            headers.get("x-ratelimit-reset").unwrap(),
            &decision.reset_at.timestamp().to_string()
        );
    }

    #[test]
    fn test_retry_after_measures_to_reset() {
        let limiter = limiter(1, 60_000);
        let now = at(0);
        let decision = limiter.admit("k", now);

        assert_eq!(decision.retry_after(now), Duration::from_secs(60));
        assert_eq!(decision.retry_after(decision.reset_at), Duration::ZERO);
    }

    #[test]
    fn test_sweep_removes_stale_records() {
        let limiter = limiter(5, 1000);

        limiter.admit("old", at(0));
        limiter.admit("fresh", at(4));
        assert_eq!(limiter.len(), 2);

        // "old" reset at t=1, grace one window (1s): stale after t=2.
        let removed = limiter.sweep(at(5));
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_denial_counted() {
        let metrics = Arc::new(crate::observability::InMemoryMetricsCollector::new());
        let limiter = limiter(1, 1000).with_metrics(metrics.clone());

        limiter.admit("k", at(0));
        limiter.admit("k", at(0));

        assert_eq!(metrics.get_counter("rate_limit_denied"), 1);
    }

    #[test]
    fn test_sweep_keeps_active_windows() {
        let limiter = limiter(5, 60_000);
        limiter.admit("k", at(0));

        assert_eq!(limiter.sweep(at(30)), 0);
        assert_eq!(limiter.len(), 1);
    }
}
