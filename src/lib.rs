//! # Listings Client
//!
//! Resilient client for paginated property-listing APIs.
//!
//! ## Features
//!
//! - Per-attempt deadlines with exponential-backoff retries
//! - Caller aborts distinct from internal timeouts (no retry on deliberate cancellation)
//! - Never-failing fallback fetches for call sites that must always render
//! - Stateful paginated controller with single-flight and stale-result discard
//! - Keyed fixed-window admission control with `X-RateLimit-*` headers
//! - Structured logging (`tracing`) and pluggable metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use listings_client::{create_client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("https://api.example.com")
//!         .build()?;
//!     let client = create_client(config)?;
//!
//!     let listings = client.listings(Vec::new());
//!     listings.refresh().await;
//!     let state = listings.state();
//!     println!("{} listings on page {}", state.items.len(), state.page_info.current_page);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Client assembly and factory functions
//! - `config` - Configuration types and builder
//! - `transport` - HTTP transport seam
//! - `resilience` - Timeout/retry executor and fixed-window rate limiter
//! - `fetch` - Resilient fetch facade with fallback substitution
//! - `listings` - Paginated resource controller
//! - `errors` - Error taxonomy
//! - `types` - Wire and query types
//! - `observability` - Logging and metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod client;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod listings;
pub mod observability;
pub mod resilience;
pub mod transport;
pub mod types;

// Development/testing modules
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mocks;

// Re-exports for convenience
pub use client::{create_client, create_client_from_env, ListingsClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use errors::{FetchError, FetchResult};
pub use fetch::ResilientFetcher;
pub use listings::{ResourceController, ResourceState};
pub use observability::{
    init_logging, InMemoryMetricsCollector, LogFormat, LogLevel, LoggingConfig, MetricsCollector,
    NoopMetricsCollector,
};
pub use resilience::{
    FixedWindowLimiter, RateLimitConfig, RateLimitDecision, RetryConfig, RetryExecutor,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{ApiErrorBody, FilterValue, Listing, ListingQuery, Page, PageInfo};

/// The default per-attempt deadline in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;

/// The default total number of attempts per logical fetch
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The default backoff delay before the first retry, in milliseconds
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// The default backoff delay cap in milliseconds
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// The default per-key admission limit per window
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

/// The default admission window length in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

/// The default page size for listing queries
pub const DEFAULT_PAGE_SIZE: u32 = 10;
