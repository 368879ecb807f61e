//! Test fixtures: canned wire bodies and sample listings.

use crate::transport::HttpResponse;
use crate::types::Listing;
use bytes::Bytes;
use http::HeaderMap;

/// A one-item success page, matching the API wire shape.
pub const SINGLE_PAGE_BODY: &str = r#"{
    "items": [
        {
            "id": "1",
            "title": "2-bed apartment, Lekki Phase 1",
            "city": "Lagos",
            "state": "Lagos",
            "price": 1500000.0,
            "bedrooms": 2,
            "bathrooms": 2,
            "listingType": "rent",
            "imageUrl": "https://cdn.example.com/listings/1.jpg"
        }
    ],
    "pagination": {"currentPage": 1, "totalPages": 1, "limit": 10, "total": 1}
}"#;

/// A structured error body as the API emits on failures.
pub const ERROR_BODY: &str = r#"{"error": "internal", "message": "something went wrong"}"#;

/// Build a JSON response with the given status and body.
pub fn json_response(status: u16, body: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    HttpResponse {
        status,
        headers,
        body: Bytes::from(body.to_string()),
    }
}

/// Build a success page body for `total` listings at `page` of `page_size`.
pub fn page_body(ids: &[&str], page: u32, total_pages: u32, total: u64) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id": "{}", "title": "Listing {}", "city": "Lagos", "price": 100.0, "bedrooms": 1, "bathrooms": 1}}"#,
                id, id
            )
        })
        .collect();
    format!(
        r#"{{"items": [{}], "pagination": {{"currentPage": {}, "totalPages": {}, "limit": 10, "total": {}}}}}"#,
        items.join(","),
        page,
        total_pages,
        total
    )
}

/// Fallback dataset used by controller tests.
pub fn fallback_listings() -> Vec<Listing> {
    vec![Listing {
        id: "fallback-1".to_string(),
        title: "Sample listing".to_string(),
        city: "Lagos".to_string(),
        state: None,
        price: 0.0,
        bedrooms: 1,
        bathrooms: 1,
        listing_type: None,
        image_url: None,
    }]
}
