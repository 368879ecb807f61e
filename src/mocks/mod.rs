//! Mock implementations for testing.

use crate::errors::{FetchError, FetchResult};
use crate::transport::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use http::{HeaderMap, Method};
use mockall::mock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Scripted HTTP transport.
///
/// Responses and errors are consumed in push order, every call is counted,
/// and requested URLs are recorded so tests can assert on query parameters
/// and on single-flight behavior.
pub struct MockTransport {
    script: Mutex<VecDeque<FetchResult<HttpResponse>>>,
    requests: Mutex<Vec<Url>>,
    calls: AtomicU32,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    /// Create an empty mock transport
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            delay: Mutex::new(None),
        }
    }

    /// Queue a response for the next unserved call
    pub fn push_response(&self, response: HttpResponse) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a transport error for the next unserved call
    pub fn push_error(&self, error: FetchError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Delay every call by `delay` before serving it
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of calls served so far
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in call order
    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recently requested URL
    pub fn last_url(&self) -> Option<Url> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        _method: Method,
        url: Url,
        _headers: HeaderMap,
    ) -> FetchResult<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Internal {
                    message: "No scripted response remaining".to_string(),
                })
            })
    }
}

// Mockall-based mock for expectation-style tests
mock! {
    pub RemoteTransport {}

    #[async_trait]
    impl HttpTransport for RemoteTransport {
        async fn send(
            &self,
            method: Method,
            url: Url,
            headers: HeaderMap,
        ) -> FetchResult<HttpResponse>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_mock_serves_in_push_order() {
        let transport = MockTransport::new();
        transport.push_response(HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::from("first"),
        });
        transport.push_error(FetchError::Network {
            message: "reset".to_string(),
        });

        let url = Url::parse("https://example.com/a").unwrap();
        let first = transport
            .send(Method::GET, url.clone(), HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(first.body, Bytes::from("first"));

        let second = transport.send(Method::GET, url, HeaderMap::new()).await;
        assert!(matches!(second, Err(FetchError::Network { .. })));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_exhausted_script_is_internal_error() {
        let transport = MockTransport::new();
        let url = Url::parse("https://example.com/a").unwrap();
        let result = transport.send(Method::GET, url, HeaderMap::new()).await;
        assert!(matches!(result, Err(FetchError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_mock_records_requested_urls() {
        let transport = MockTransport::new();
        transport.push_response(HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        });

        let url = Url::parse("https://example.com/listings?city=Lagos").unwrap();
        let _ = transport.send(Method::GET, url, HeaderMap::new()).await;

        let last = transport.last_url().unwrap();
        assert_eq!(last.query(), Some("city=Lagos"));
    }
}
