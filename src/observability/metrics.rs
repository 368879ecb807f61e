//! Metrics collection for fetch and admission-control activity.
//!
//! Counters emitted by the core: `fetch_attempts`, `fetch_retries`,
//! `fetch_timeouts`, `fetch_fallbacks`, `fetch_failure_streak`,
//! `rate_limit_denied`.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Metrics collector seam.
///
/// The core only needs labeled counters; hosts bridge this to their own
/// metrics backend.
pub trait MetricsCollector: Send + Sync {
    /// Increments a counter by the given value.
    fn increment_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]);
}

/// Collector that discards every metric.
pub struct NoopMetricsCollector;

impl MetricsCollector for NoopMetricsCollector {
    fn increment_counter(&self, _name: &str, _value: u64, _labels: &[(&str, &str)]) {}
}

/// In-memory collector for tests and simple deployments.
#[derive(Default)]
pub struct InMemoryMetricsCollector {
    counters: RwLock<HashMap<String, u64>>,
}

impl InMemoryMetricsCollector {
    /// Creates a new in-memory collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, ignoring labels; 0 when absent.
    pub fn get_counter(&self, name: &str) -> u64 {
        let counters = self.counters.read();
        counters
            .iter()
            .filter(|(key, _)| key.as_str() == name || key.starts_with(&format!("{}:", name)))
            .map(|(_, v)| v)
            .sum()
    }

    /// Current value of a counter under an exact label set; 0 when absent.
    pub fn get_counter_with_labels(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.counters
            .read()
            .get(&Self::make_key(name, labels))
            .copied()
            .unwrap_or(0)
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.counters.write().clear();
    }

    fn make_key(name: &str, labels: &[(&str, &str)]) -> String {
        if labels.is_empty() {
            name.to_string()
        } else {
            let label_str: Vec<String> =
                labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}:{}", name, label_str.join(","))
        }
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn increment_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]) {
        let key = Self::make_key(name, labels);
        let mut counters = self.counters.write();
        *counters.entry(key).or_insert(0) += value;
    }
}
