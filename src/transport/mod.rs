//! HTTP transport layer.
//!
//! The transport is a thin seam over the HTTP client: it moves bytes and
//! reports transport failures, nothing more. Deadlines, retries, and status
//! interpretation live in [`crate::resilience`] and [`crate::fetch`].

use crate::errors::{FetchError, FetchResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use reqwest::Client;
use url::Url;

/// HTTP transport abstraction for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the raw response, whatever its status.
    ///
    /// Implementations fail only on transport-level problems; a non-2xx
    /// status is a successful transport outcome and is classified upstream.
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
    ) -> FetchResult<HttpResponse>;
}

/// Raw HTTP response as seen by the transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the `Content-Type` header value, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Reqwest-based HTTP transport implementation.
///
/// Built without a client-level timeout: the retry executor owns the
/// per-attempt deadline and cancels the in-flight request by dropping its
/// future.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport
    pub fn new() -> FetchResult<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| FetchError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
    ) -> FetchResult<HttpResponse> {
        let reqwest_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|e| FetchError::Internal {
                message: format!("Invalid HTTP method: {}", e),
            })?;

        let mut request = self.client.request(reqwest_method, url.as_str());
        for (name, value) in headers.iter() {
            request = request.header(name.as_str(), value.as_bytes());
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let mut response_headers = HeaderMap::new();
        for (name, value) in response.headers().iter() {
            if let (Ok(name), Ok(value)) = (
                http::header::HeaderName::from_bytes(name.as_str().as_bytes()),
                http::header::HeaderValue::from_bytes(value.as_bytes()),
            ) {
                response_headers.insert(name, value);
            }
        }
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
