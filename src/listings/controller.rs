//! Stateful controller for one paginated list view.

use crate::errors::{FetchError, FetchResult};
use crate::fetch::ResilientFetcher;
use crate::observability::{MetricsCollector, NoopMetricsCollector};
use crate::types::{FilterValue, ListingQuery, Page, PageInfo};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Consecutive failures before the escalated warning fires.
const FAILURE_STREAK_THRESHOLD: u32 = 3;

/// Snapshot of a controller's view state.
///
/// `items` and `page_info` always describe the same applied response; the
/// two are replaced together under one lock.
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    /// Items of the last applied page (or the fallback dataset after a failure)
    pub items: Vec<T>,
    /// Pagination metadata of the last applied page
    pub page_info: PageInfo,
    /// The query the controller will issue next
    pub query: ListingQuery,
    /// Whether a fetch is currently in flight
    pub loading: bool,
    /// Human-readable message for the last failure, cleared on success
    pub error: Option<String>,
}

/// Stateful controller for a paginated, filterable resource collection.
///
/// One instance per UI consumer. Enforces single-flight: at most one
/// transport call is in progress per controller, and a filter or page change
/// arriving mid-flight is deferred until the current fetch settles, after
/// which the latest desired query is issued. Every issued query carries a
/// monotonic sequence number; a settled result is applied only when its
/// sequence is still the latest requested, so a superseded fetch can never
/// overwrite newer state.
pub struct ResourceController<T> {
    fetcher: Arc<ResilientFetcher>,
    path: String,
    fallback_items: Vec<T>,
    state: Mutex<ResourceState<T>>,
    in_flight: AtomicBool,
    desired_seq: AtomicU64,
    failure_streak: AtomicU32,
    cancel: CancellationToken,
    metrics: Arc<dyn MetricsCollector>,
}

impl<T> ResourceController<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// Create a controller for `path` with the fallback dataset shown when a
    /// fetch fails.
    pub fn new(fetcher: Arc<ResilientFetcher>, path: impl Into<String>, fallback_items: Vec<T>) -> Self {
        Self {
            fetcher,
            path: path.into(),
            fallback_items,
            state: Mutex::new(ResourceState {
                items: Vec::new(),
                page_info: PageInfo::default(),
                query: ListingQuery::new(),
                loading: false,
                error: None,
            }),
            in_flight: AtomicBool::new(false),
            desired_seq: AtomicU64::new(0),
            failure_streak: AtomicU32::new(0),
            cancel: CancellationToken::new(),
            metrics: Arc::new(NoopMetricsCollector),
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Sets the page size used by subsequent queries
    pub fn with_page_size(self, page_size: u32) -> Self {
        self.state.lock().query.page_size = page_size.max(1);
        self
    }

    /// Current view state
    pub fn state(&self) -> ResourceState<T> {
        self.state.lock().clone()
    }

    /// Merge `patch` into the current filters, reset to page 1, and fetch.
    pub async fn apply_filters(
        &self,
        patch: impl IntoIterator<Item = (String, FilterValue)>,
    ) {
        {
            let mut state = self.state.lock();
            for (key, value) in patch {
                state.query.filters.insert(key, value);
            }
            state.query.page = 1;
        }
        self.request_fetch().await;
    }

    /// Go to page `n`, clamped to `[1, total_pages]`, and fetch.
    pub async fn go_to_page(&self, n: u32) {
        {
            let mut state = self.state.lock();
            let total = state.page_info.total_pages.max(1);
            state.query.page = n.clamp(1, total);
        }
        self.request_fetch().await;
    }

    /// Re-issue the current query. No-op while a fetch is already in flight.
    pub async fn refresh(&self) {
        if self.in_flight.load(Ordering::SeqCst) {
            return;
        }
        self.request_fetch().await;
    }

    /// Abort the controller (consumer unmounted).
    ///
    /// Cancels any in-flight fetch; a result settling after this point is
    /// discarded and never applied to state.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Register the newest desired query and drive fetches until state
    /// reflects it. Returns immediately when another call is already driving;
    /// that driver will observe the bumped sequence and re-issue.
    async fn request_fetch(&self) {
        self.desired_seq.fetch_add(1, Ordering::SeqCst);
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return;
        }
        self.drive().await;
    }

    async fn drive(&self) {
        loop {
            if self.cancel.is_cancelled() {
                self.in_flight.store(false, Ordering::SeqCst);
                return;
            }

            let my_seq = self.desired_seq.load(Ordering::SeqCst);
            let query = {
                let mut state = self.state.lock();
                state.loading = true;
                state.query.clone()
            };

            // The resource path doubles as the operation label in logs and
            // metrics.
            let result: FetchResult<Page<T>> = self
                .fetcher
                .execute_json(&self.path, &self.path, &query.to_query_pairs(), &self.cancel)
                .await;

            if self.desired_seq.load(Ordering::SeqCst) == my_seq {
                self.apply_outcome(result);
            }
            // A newer query was requested mid-flight: the settled result is
            // stale and discarded; loop to issue the latest query.

            if self.desired_seq.load(Ordering::SeqCst) != my_seq && !self.cancel.is_cancelled() {
                continue;
            }

            self.in_flight.store(false, Ordering::SeqCst);

            // A request that arrived between the release above and its own
            // in_flight check may have bailed; pick its sequence up here.
            if self.desired_seq.load(Ordering::SeqCst) != my_seq
                && !self.cancel.is_cancelled()
                && !self.in_flight.swap(true, Ordering::SeqCst)
            {
                continue;
            }
            return;
        }
    }

    fn apply_outcome(&self, result: FetchResult<Page<T>>) {
        match result {
            Ok(page) => {
                let mut state = self.state.lock();
                state.items = page.items;
                state.page_info = page.pagination;
                // Published pagination stays inside [1, total_pages] even
                // when the server misreports currentPage.
                let total = state.page_info.total_pages.max(1);
                state.page_info.current_page = state.page_info.current_page.clamp(1, total);
                state.query.page = state.page_info.current_page;
                state.error = None;
                state.loading = false;
                self.failure_streak.store(0, Ordering::SeqCst);
            }
            Err(FetchError::Cancelled) => {
                // Deliberate abort: leave whatever was on screen untouched.
                self.state.lock().loading = false;
            }
            Err(e) => {
                let mut state = self.state.lock();
                state.error = Some(e.user_message().to_string());
                state.items = self.fallback_items.clone();
                state.loading = false;
                drop(state);

                let streak = self.failure_streak.fetch_add(1, Ordering::SeqCst) + 1;
                if streak >= FAILURE_STREAK_THRESHOLD {
                    warn!(
                        path = %self.path,
                        streak,
                        error = %e,
                        "repeated fetch failures"
                    );
                    self.metrics.increment_counter(
                        "fetch_failure_streak",
                        1,
                        &[("path", self.path.as_str())],
                    );
                }
            }
        }
    }
}
