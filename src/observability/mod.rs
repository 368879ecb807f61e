//! Observability: structured logging and metrics collection.
//!
//! Logging rides on the `tracing` ecosystem; metrics go through a small
//! collector trait so tests can assert on counters and production code can
//! bridge to whatever backend the host application runs.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
pub use metrics::{InMemoryMetricsCollector, MetricsCollector, NoopMetricsCollector};
