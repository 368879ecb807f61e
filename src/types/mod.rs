//! Wire and query types shared across the fetch path.

use crate::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single filter value: a scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String scalar
    Str(String),
    /// Integer scalar
    Int(i64),
    /// Floating-point scalar
    Float(f64),
    /// Boolean scalar
    Bool(bool),
    /// List of scalars, rendered as one query pair per element
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Render this value into query-string values.
    ///
    /// Scalars yield one value; lists yield one per element. Nested lists are
    /// flattened.
    pub fn query_values(&self) -> Vec<String> {
        match self {
            FilterValue::Str(s) => vec![s.clone()],
            FilterValue::Int(i) => vec![i.to_string()],
            FilterValue::Float(f) => vec![f.to_string()],
            FilterValue::Bool(b) => vec![b.to_string()],
            FilterValue::List(values) => {
                values.iter().flat_map(FilterValue::query_values).collect()
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Str(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl<V: Into<FilterValue>> From<Vec<V>> for FilterValue {
    fn from(values: Vec<V>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One issued query: filters plus pagination coordinates.
///
/// Built fresh per fetch and immutable once issued. `BTreeMap` keeps the
/// rendered parameter order deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    /// Filter parameters, keyed by API field name
    pub filters: BTreeMap<String, FilterValue>,
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
}

impl ListingQuery {
    /// Creates an unfiltered query for page 1
    pub fn new() -> Self {
        Self {
            filters: BTreeMap::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Adds a filter
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Sets the page number (minimum 1)
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size (minimum 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Render the query as URL parameter pairs: filters first (sorted by
    /// key), then `page` and `limit`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.filters {
            for rendered in value.query_values() {
                pairs.push((key.clone(), rendered));
            }
        }
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("limit".to_string(), self.page_size.to_string()));
        pairs
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Pagination block of a success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page the items belong to
    pub current_page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Page size the server applied
    pub limit: u32,
    /// Total matching items across all pages
    pub total: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            limit: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

/// Success body shape: one page of resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: PageInfo,
}

/// Failure body shape on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error tag
    pub error: String,
    /// Optional human-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A property listing as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Unique listing identifier
    pub id: String,
    /// Listing headline
    #[serde(default)]
    pub title: String,
    /// City the property is in
    #[serde(default)]
    pub city: String,
    /// State or region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Asking price or rent
    #[serde(default)]
    pub price: f64,
    /// Number of bedrooms
    #[serde(default)]
    pub bedrooms: u32,
    /// Number of bathrooms
    #[serde(default)]
    pub bathrooms: u32,
    /// Sale or rental
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,
    /// Primary image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
