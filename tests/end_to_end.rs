//! End-to-end scenarios against a real HTTP server.

use listings_client::{ClientConfig, FetchError, Listing, ListingsClient, Page, ResilientFetcher};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_BODY: &str = r#"{
    "items": [{"id": "1", "title": "Flat", "city": "Lagos", "price": 900.0, "bedrooms": 1, "bathrooms": 1}],
    "pagination": {"currentPage": 1, "totalPages": 1, "limit": 10, "total": 1}
}"#;

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(500))
        .max_attempts(3)
        .base_delay(Duration::from_millis(10))
        .retry_server_errors(true)
        .build()
        .unwrap()
}

#[tokio::test]
async fn recovers_after_two_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            r#"{"error": "internal", "message": "flaky"}"#,
            "application/json",
        ))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_BODY, "application/json"))
        .mount(&server)
        .await;

    let client = ListingsClient::new(config_for(&server)).unwrap();
    let controller = client.listings(Vec::new());
    controller.refresh().await;

    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, "1");
}

#[tokio::test]
async fn hanging_backend_raises_timeout_within_deadline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PAGE_BODY, "application/json")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .max_attempts(1)
        .build()
        .unwrap();
    let fetcher = ResilientFetcher::new(config).unwrap();
    let cancel = CancellationToken::new();

    let started = Instant::now();
    let result: Result<Page<Listing>, FetchError> = fetcher
        .execute_json("listings", "/listings", &[], &cancel)
        .await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
    // ~100ms plus scheduling slack, nowhere near the 10s hang.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn filters_and_pagination_reach_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("city", "Lagos"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_BODY, "application/json"))
        .mount(&server)
        .await;

    let client = ListingsClient::new(config_for(&server)).unwrap();
    let controller = client.listings(Vec::new());
    controller
        .apply_filters([(
            "city".to_string(),
            listings_client::FilterValue::from("Lagos"),
        )])
        .await;

    let state = controller.state();
    assert_eq!(state.error, None);
    assert_eq!(state.items.len(), 1);
}

#[tokio::test]
async fn persistent_failure_resolves_to_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(503).set_body_raw(
            r#"{"error": "unavailable"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(500))
        .max_attempts(2)
        .base_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    let fetcher = ResilientFetcher::new(config).unwrap();

    let fallback = serde_json::json!({"totalListings": 0});
    let stats: serde_json::Value = fetcher
        .fetch_with_fallback("stats", "/stats", &[], fallback.clone())
        .await;

    assert_eq!(stats, fallback);
}
