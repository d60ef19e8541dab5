//! Debounced free-text search and on-demand filtering.
//!
//! # Design
//! Every input change bumps a generation counter and cancels the pending
//! timer. The scheduled request remembers the generation it was issued
//! under; when its response arrives it is applied only if no newer input has
//! been seen since. A slow superseded response therefore never overwrites the
//! results of a newer one, whether or not the newer one has completed.
//!
//! The blocking `Catalog` call runs on Tokio's blocking pool, so a session
//! must be driven from inside a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{
    DEFAULT_FILTER_LIMIT, DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE, SEARCH_MIN_QUERY_LEN,
};
use crate::queries::{Catalog, FetchState};
use crate::transport::Transport;
use crate::types::{Book, FilterOptions};

/// What the search screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub books: Vec<Book>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Shared {
    state: SearchState,
    generation: u64,
}

impl Shared {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn reset_results(&mut self) {
        self.state.books.clear();
        self.state.error = None;
        self.state.loading = false;
    }

    fn mark_loading(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state.loading = true;
        self.state.error = None;
        true
    }

    fn apply(&mut self, generation: u64, result: FetchState<Vec<Book>>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state.books = result.data;
        self.state.error = result.error;
        self.state.loading = false;
        true
    }
}

pub struct SearchSession<T: Transport + 'static> {
    catalog: Arc<Catalog<T>>,
    debounce: Duration,
    min_query_len: usize,
    limit: usize,
    filter_limit: usize,
    shared: Arc<Mutex<Shared>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport + 'static> SearchSession<T> {
    pub fn new(catalog: Arc<Catalog<T>>) -> Self {
        Self {
            catalog,
            debounce: SEARCH_DEBOUNCE,
            min_query_len: SEARCH_MIN_QUERY_LEN,
            limit: DEFAULT_PAGE_SIZE,
            filter_limit: DEFAULT_FILTER_LIMIT,
            shared: Arc::new(Mutex::new(Shared::default())),
            pending: Mutex::new(None),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    /// Records a new input value. Queries shorter than the minimum length
    /// (after trimming) clear the results immediately; anything else is
    /// searched once the input has been quiet for the debounce period.
    pub fn set_query(&self, query: &str) {
        let trimmed = query.trim().to_string();
        let generation = {
            let mut shared = lock(&self.shared);
            shared.state.query = query.to_string();
            let generation = shared.next_generation();
            if trimmed.chars().count() < self.min_query_len {
                shared.reset_results();
                None
            } else {
                Some(generation)
            }
        };

        match generation {
            Some(generation) => {
                let limit = self.limit;
                self.schedule(generation, self.debounce, move |catalog| {
                    catalog.search(&trimmed, limit)
                });
            }
            None => {
                self.cancel_pending();
                debug!("query below minimum length, results cleared");
            }
        }
    }

    /// Runs a filter request right away. With no criteria set nothing is
    /// requested and the visible state is left as it is.
    pub fn filter(&self, filters: &FilterOptions) {
        if filters.is_empty() {
            debug!("no filters set, keeping current results");
            return;
        }
        let generation = lock(&self.shared).next_generation();
        let filters = filters.clone();
        let limit = self.filter_limit;
        self.schedule(generation, Duration::ZERO, move |catalog| {
            catalog.filter_uncached(&filters, 0, limit)
        });
    }

    /// Cancels any pending request and empties query and results.
    pub fn clear(&self) {
        {
            let mut shared = lock(&self.shared);
            shared.next_generation();
            shared.state.query.clear();
            shared.reset_results();
        }
        self.cancel_pending();
    }

    pub fn snapshot(&self) -> SearchState {
        lock(&self.shared).state.clone()
    }

    /// Waits until the most recently scheduled request has been applied
    /// (or discarded).
    pub async fn settle(&self) {
        let handle = lock(&self.pending).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn schedule<F>(&self, generation: u64, delay: Duration, request: F)
    where
        F: FnOnce(&Catalog<T>) -> FetchState<Vec<Book>> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        let shared = Arc::clone(&self.shared);

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if !lock(&shared).mark_loading(generation) {
                return;
            }
            debug!(generation, "issuing search request");

            let result = tokio::task::spawn_blocking(move || request(catalog.as_ref()))
                .await
                .unwrap_or_else(|e| FetchState {
                    data: Vec::new(),
                    loading: false,
                    error: Some(format!("Search failed: {e}")),
                });

            if !lock(&shared).apply(generation, result) {
                debug!(generation, "discarding stale search response");
            }
        });

        if let Some(previous) = lock(&self.pending).replace(handle) {
            previous.abort();
        }
    }

    fn cancel_pending(&self) {
        if let Some(previous) = lock(&self.pending).take() {
            previous.abort();
        }
    }
}

impl<T: Transport + 'static> Drop for SearchSession<T> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::api::BookApi;
    use crate::error::ApiError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::testing::StubTransport;

    const DUNE: &str = r#"[{"bookId":"1","title":"Dune","author":"Frank Herbert"}]"#;

    fn session(stub: &StubTransport) -> SearchSession<StubTransport> {
        let catalog = Catalog::new(BookApi::new("http://books.test", stub.clone()));
        SearchSession::new(Arc::new(catalog))
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_only_the_last_query() {
        let stub = StubTransport::new().route("/search/books", 200, DUNE);
        let session = session(&stub);

        session.set_query("d");
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.set_query("du");
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.set_query("dune");
        session.settle().await;

        assert_eq!(stub.calls(), 1);
        assert_eq!(stub.last_request().unwrap().query_param("q"), Some("dune"));
        let state = session.snapshot();
        assert_eq!(state.query, "dune");
        assert_eq!(state.books.len(), 1);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn request_waits_for_the_quiet_period() {
        let stub = StubTransport::new().route("/search/books", 200, DUNE);
        let session = session(&stub);

        session.set_query("dune");
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(stub.calls(), 0);
        session.settle().await;
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_clears_without_request() {
        let stub = StubTransport::new().route("/search/books", 200, DUNE);
        let session = session(&stub);

        session.set_query("dune");
        session.settle().await;
        assert_eq!(session.snapshot().books.len(), 1);

        session.set_query("   ");
        session.settle().await;
        assert!(session.snapshot().books.is_empty());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_cancels_pending_search() {
        let stub = StubTransport::new().route("/search/books", 200, DUNE);
        let session = session(&stub).with_min_query_len(3);

        session.set_query("dune");
        session.set_query("du");
        session.settle().await;
        assert_eq!(stub.calls(), 0);
        assert!(session.snapshot().books.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_filters_leave_results_untouched() {
        let stub = StubTransport::new().route("/search/books", 200, DUNE);
        let session = session(&stub);

        session.set_query("dune");
        session.settle().await;
        session.filter(&FilterOptions::default());
        session.settle().await;

        assert_eq!(stub.calls(), 1);
        assert_eq!(session.snapshot().books.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn filter_runs_without_debounce() {
        let stub = StubTransport::new().route("/books/filter", 200, DUNE);
        let session = session(&stub);

        session.filter(&FilterOptions {
            min_rating: Some(4.0),
            ..Default::default()
        });
        session.settle().await;

        let request = stub.last_request().unwrap();
        assert_eq!(request.query_param("min_rating"), Some("4"));
        assert_eq!(request.query_param("limit"), Some("50"));
        assert_eq!(session.snapshot().books[0].title, "Dune");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_sets_error_and_empties_results() {
        let stub = StubTransport::new().route("/search/books", 502, "bad gateway");
        let session = session(&stub);

        session.set_query("dune");
        session.settle().await;

        let state = session.snapshot();
        assert!(state.books.is_empty());
        assert!(!state.error.unwrap_or_default().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_search() {
        let stub = StubTransport::new().route("/search/books", 200, DUNE);
        let session = session(&stub);

        session.set_query("dune");
        session.clear();
        session.settle().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(stub.calls(), 0);
        assert_eq!(session.snapshot(), SearchState::default());
    }

    /// Holds every search for `q=slow` until released; other queries answer
    /// at once. Each query returns one book titled after it.
    #[derive(Clone, Default)]
    struct GatedTransport {
        gate: Arc<(Mutex<bool>, std::sync::Condvar)>,
        slow_started: Arc<AtomicBool>,
        slow_finished: Arc<AtomicBool>,
    }

    impl GatedTransport {
        fn release(&self) {
            *lock(&self.gate.0) = true;
            self.gate.1.notify_all();
        }
    }

    impl Transport for GatedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            let q = request.query_param("q").unwrap_or_default().to_string();
            if q == "slow" {
                self.slow_started.store(true, Ordering::SeqCst);
                let mut open = lock(&self.gate.0);
                while !*open {
                    open = self.gate.1.wait(open).unwrap_or_else(PoisonError::into_inner);
                }
                self.slow_finished.store(true, Ordering::SeqCst);
            }
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: serde_json::to_string(&[book(&q)]).unwrap(),
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_superseded_search_never_overwrites_newer_results() {
        let transport = GatedTransport::default();
        let catalog = Catalog::new(BookApi::new("http://books.test", transport.clone()));
        let session = SearchSession::new(Arc::new(catalog)).with_debounce(Duration::ZERO);

        session.set_query("slow");
        while !transport.slow_started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(session.snapshot().loading);

        session.set_query("fast");
        session.settle().await;
        assert_eq!(session.snapshot().books[0].title, "fast");

        transport.release();
        while !transport.slow_finished.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let state = session.snapshot();
        assert_eq!(state.query, "fast");
        assert_eq!(state.books.len(), 1);
        assert_eq!(state.books[0].title, "fast");
        assert!(!state.loading);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut shared = Shared::default();
        let older = shared.next_generation();
        let newer = shared.next_generation();

        let fresh = FetchState {
            data: vec![book("new")],
            loading: false,
            error: None,
        };
        assert!(shared.apply(newer, fresh));

        let stale = FetchState {
            data: vec![book("old")],
            loading: false,
            error: None,
        };
        assert!(!shared.apply(older, stale));
        assert!(!shared.mark_loading(older));
        assert_eq!(shared.state.books[0].title, "new");
    }

    fn book(title: &str) -> Book {
        Book {
            book_id: title.to_string(),
            title: title.to_string(),
            author: "anon".to_string(),
            rating: None,
            ratings_count: None,
            reviews_count: None,
            description: None,
            genres: Vec::new(),
            cover_img: None,
            published_date: None,
        }
    }
}
