//! Client assembly: wires config, transport, fetcher, and controllers.

use crate::config::ClientConfig;
use crate::errors::FetchResult;
use crate::fetch::ResilientFetcher;
use crate::listings::ResourceController;
use crate::observability::{MetricsCollector, NoopMetricsCollector};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::Listing;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Top-level client for the listings API.
pub struct ListingsClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    fetcher: Arc<ResilientFetcher>,
    metrics: Arc<dyn MetricsCollector>,
}

impl ListingsClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> FetchResult<Self> {
        let transport = Arc::new(ReqwestTransport::new()?) as Arc<dyn HttpTransport>;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client with a custom transport (tests, instrumentation)
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::assemble(config, transport, Arc::new(NoopMetricsCollector))
    }

    /// Rebuild the client with a metrics collector
    pub fn with_metrics(self, metrics: Arc<dyn MetricsCollector>) -> Self {
        Self::assemble(self.config, self.transport, metrics)
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Self {
        let fetcher = Arc::new(
            ResilientFetcher::with_transport(config.clone(), Arc::clone(&transport))
                .with_metrics(Arc::clone(&metrics)),
        );
        Self {
            config,
            transport,
            fetcher,
            metrics,
        }
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared resilient fetcher
    pub fn fetcher(&self) -> Arc<ResilientFetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Build a controller for an arbitrary paginated resource
    pub fn controller<T>(
        &self,
        path: impl Into<String>,
        fallback_items: Vec<T>,
    ) -> ResourceController<T>
    where
        T: DeserializeOwned + Clone + Send + Sync,
    {
        ResourceController::new(Arc::clone(&self.fetcher), path, fallback_items)
            .with_metrics(Arc::clone(&self.metrics))
    }

    /// Build a controller for the property-listings collection
    pub fn listings(&self, fallback_items: Vec<Listing>) -> ResourceController<Listing> {
        self.controller("/listings", fallback_items)
    }
}

/// Create a new listings client from configuration
pub fn create_client(config: ClientConfig) -> FetchResult<ListingsClient> {
    ListingsClient::new(config)
}

/// Create a new listings client from environment variables
pub fn create_client_from_env() -> FetchResult<ListingsClient> {
    let config = ClientConfig::from_env()?;
    create_client(config)
}
