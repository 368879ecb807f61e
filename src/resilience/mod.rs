//! Resilience patterns for the fetch path.
//!
//! Two independent pieces: a per-attempt timeout/retry executor used on the
//! client side, and a keyed fixed-window rate limiter used as admission
//! control in front of the API.

pub mod rate_limiter;
pub mod retry;


pub use rate_limiter::{FixedWindowLimiter, RateLimitConfig, RateLimitDecision};
pub use retry::{RetryConfig, RetryExecutor};
