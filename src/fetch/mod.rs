//! Resilient fetch facade.
//!
//! [`ResilientFetcher`] is the single place where a request URL is built,
//! pushed through the timeout/retry executor, and its response validated and
//! decoded. It exposes two contracts: a throwing one
//! ([`ResilientFetcher::execute_json`]) for callers that branch on failure
//! kind, and a never-failing one ([`ResilientFetcher::fetch_with_fallback`])
//! for call sites that must always render something.

use crate::config::ClientConfig;
use crate::errors::{FetchError, FetchResult};
use crate::observability::{MetricsCollector, NoopMetricsCollector};
use crate::resilience::{RetryConfig, RetryExecutor};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::types::ApiErrorBody;
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

/// Facade over transport + retry executor with response validation.
pub struct ResilientFetcher {
    transport: Arc<dyn HttpTransport>,
    executor: RetryExecutor,
    config: ClientConfig,
    metrics: Arc<dyn MetricsCollector>,
}

impl ResilientFetcher {
    /// Create a fetcher backed by a real HTTP transport
    pub fn new(config: ClientConfig) -> FetchResult<Self> {
        let transport = Arc::new(ReqwestTransport::new()?) as Arc<dyn HttpTransport>;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a fetcher with a custom transport (tests, instrumentation)
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let executor = RetryExecutor::new(RetryConfig::from(&config));
        Self {
            transport,
            executor,
            config,
            metrics: Arc::new(NoopMetricsCollector),
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.executor = RetryExecutor::new(RetryConfig::from(&self.config))
            .with_metrics(Arc::clone(&metrics));
        self.metrics = metrics;
        self
    }

    /// The configuration this fetcher was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch and decode a JSON resource, raising on every failure kind.
    ///
    /// Non-2xx responses are parsed for a structured `{error, message}`
    /// payload and raised as [`FetchError::Http`] without retry (unless 5xx
    /// retries are configured). A 2xx with a non-JSON content-type or an
    /// unparseable body raises [`FetchError::Parse`].
    pub async fn execute_json<T: DeserializeOwned + Send>(
        &self,
        operation: &str,
        path: &str,
        query: &[(String, String)],
        cancel: &CancellationToken,
    ) -> FetchResult<T> {
        let url = self.build_url(path, query)?;

        let transport = Arc::clone(&self.transport);
        let attempt_url = url.clone();
        self.executor
            .execute(operation, cancel, move || {
                let transport = Arc::clone(&transport);
                let url = attempt_url.clone();
                async move {
                    let response = transport.send(Method::GET, url, default_headers()).await?;
                    decode_json::<T>(response)
                }
            })
            .await
    }

    /// Fetch a JSON resource, resolving to `fallback` on any failure.
    ///
    /// Never fails: timeout, transport failure, non-2xx, wrong content-type,
    /// and malformed JSON all log a warning, bump the `fetch_fallbacks`
    /// counter, and return exactly the supplied fallback. The generic
    /// parameter makes shape compatibility a compile-time fact.
    pub async fn fetch_with_fallback<T: DeserializeOwned + Send>(
        &self,
        operation: &str,
        path: &str,
        query: &[(String, String)],
        fallback: T,
    ) -> T {
        let cancel = CancellationToken::new();
        self.fetch_with_fallback_cancellable(operation, path, query, fallback, &cancel)
            .await
    }

    /// [`Self::fetch_with_fallback`] with a caller-held abort signal.
    pub async fn fetch_with_fallback_cancellable<T: DeserializeOwned + Send>(
        &self,
        operation: &str,
        path: &str,
        query: &[(String, String)],
        fallback: T,
        cancel: &CancellationToken,
    ) -> T {
        match self.execute_json(operation, path, query, cancel).await {
            Ok(value) => value,
            Err(e) => {
                warn!(operation, error = %e, "fetch failed, serving fallback");
                self.metrics
                    .increment_counter("fetch_fallbacks", 1, &[("operation", operation)]);
                fallback
            }
        }
    }

    /// Build the request URL: path joined to the base, filter pairs, then the
    /// optional cache-busting timestamp parameter.
    fn build_url(&self, path: &str, query: &[(String, String)]) -> FetchResult<Url> {
        let base = Url::parse(&self.config.base_url)?;
        let mut url = base.join(path)?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if self.config.cache_bust {
                pairs.append_pair("_ts", &chrono::Utc::now().timestamp_millis().to_string());
            }
        }

        Ok(url)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::ACCEPT,
        http::header::HeaderValue::from_static("application/json"),
    );
    headers
}

/// Validate and decode a raw response into `T`.
fn decode_json<T: DeserializeOwned>(response: HttpResponse) -> FetchResult<T> {
    if !response.is_success() {
        return Err(parse_http_error(&response));
    }

    if let Some(content_type) = response.content_type() {
        let is_json = content_type
            .parse::<mime::Mime>()
            .map(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
            .unwrap_or(false);
        if !is_json {
            return Err(FetchError::Parse {
                message: format!("Unexpected content type: {}", content_type),
            });
        }
    }

    serde_json::from_slice(&response.body).map_err(FetchError::from)
}

/// Map a non-2xx response to [`FetchError::Http`], preferring the structured
/// `{error, message}` payload over the raw body.
fn parse_http_error(response: &HttpResponse) -> FetchError {
    let message = match serde_json::from_slice::<ApiErrorBody>(&response.body) {
        Ok(body) => body.message.unwrap_or(body.error),
        Err(_) => String::from_utf8_lossy(&response.body).to_string(),
    };
    FetchError::Http {
        status: response.status,
        message,
    }
}
