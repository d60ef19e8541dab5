//! Per-screen data queries over the cached facade.
//!
//! # Design
//! `Catalog` owns the `BookApi` and one `RequestCache` per response shape.
//! Every query returns a `FetchState`: failures become an error string next
//! to an empty value instead of an `Err`, so screens render whatever they get
//! and never have to propagate. Each query has a `refetch_*` twin that skips
//! the freshness window.

use tracing::{debug, warn};

use crate::api::BookApi;
use crate::cache::{CacheKey, RequestCache};
use crate::config::{
    BOOKS_FRESHNESS, DEFAULT_FRESHNESS, RECOMMENDATIONS_FRESHNESS, TOP_RATED_FRESHNESS,
};
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    Book, CatalogStats, FilterOptions, HealthStatus, InputBook, Recommendation,
    RecommendationResponse,
};

/// Snapshot handed to a screen: the data (empty on failure), whether a
/// request is outstanding, and the failure message if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Default> FetchState<T> {
    /// No request was issued.
    pub fn idle() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
        }
    }

    fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self {
                data,
                loading: false,
                error: None,
            },
            Err(err) => Self {
                data: T::default(),
                loading: false,
                error: Some(err.user_message()),
            },
        }
    }
}

impl<T> FetchState<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Flattened view of `RecommendationResponse` for the recommendation screens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub input_book: Option<InputBook>,
    pub items: Vec<Recommendation>,
    pub total: usize,
}

impl From<RecommendationResponse> for Recommendations {
    fn from(resp: RecommendationResponse) -> Self {
        Self {
            input_book: Some(resp.input_book),
            items: resp.recommendations,
            total: resp.total_recommendations,
        }
    }
}

pub struct Catalog<T = UreqTransport> {
    api: BookApi<T>,
    books: RequestCache<Vec<Book>>,
    filtered: RequestCache<Vec<Book>>,
    top_rated: RequestCache<Vec<Book>>,
    book: RequestCache<Book>,
    recommendations: RequestCache<RecommendationResponse>,
    names: RequestCache<Vec<String>>,
    stats: RequestCache<CatalogStats>,
}

impl<T: Transport> Catalog<T> {
    pub fn new(api: BookApi<T>) -> Self {
        Self {
            api,
            books: RequestCache::new(BOOKS_FRESHNESS),
            filtered: RequestCache::new(DEFAULT_FRESHNESS),
            top_rated: RequestCache::new(TOP_RATED_FRESHNESS),
            book: RequestCache::new(DEFAULT_FRESHNESS),
            recommendations: RequestCache::new(RECOMMENDATIONS_FRESHNESS),
            names: RequestCache::new(DEFAULT_FRESHNESS),
            stats: RequestCache::new(DEFAULT_FRESHNESS),
        }
    }

    pub fn books(&self, skip: usize, limit: usize) -> FetchState<Vec<Book>> {
        let key = books_key(skip, limit);
        report(&key, self.books.get_or_fetch(&key, || self.api.list_books(skip, limit)))
    }

    pub fn refetch_books(&self, skip: usize, limit: usize) -> FetchState<Vec<Book>> {
        let key = books_key(skip, limit);
        report(&key, self.books.refresh(&key, || self.api.list_books(skip, limit)))
    }

    /// Empty filters issue no request and yield an idle state.
    pub fn filtered_books(
        &self,
        filters: &FilterOptions,
        skip: usize,
        limit: usize,
    ) -> FetchState<Vec<Book>> {
        if filters.is_empty() {
            debug!("no filters set, skipping filter request");
            return FetchState::idle();
        }
        let key = filter_key(filters, skip, limit);
        report(
            &key,
            self.filtered
                .get_or_fetch(&key, || self.api.filter_books(filters, skip, limit)),
        )
    }

    pub fn refetch_filtered_books(
        &self,
        filters: &FilterOptions,
        skip: usize,
        limit: usize,
    ) -> FetchState<Vec<Book>> {
        if filters.is_empty() {
            return FetchState::idle();
        }
        let key = filter_key(filters, skip, limit);
        report(
            &key,
            self.filtered
                .refresh(&key, || self.api.filter_books(filters, skip, limit)),
        )
    }

    pub fn top_rated(&self, min_ratings: u64, limit: usize) -> FetchState<Vec<Book>> {
        let key = top_rated_key(min_ratings, limit);
        report(
            &key,
            self.top_rated
                .get_or_fetch(&key, || self.api.top_rated(min_ratings, limit)),
        )
    }

    /// A missing record yields `data: None` with an error message.
    pub fn book(&self, id: &str) -> FetchState<Option<Book>> {
        let key = CacheKey::new("book").param("id", id);
        let result = self.book.get_or_fetch(&key, || self.api.get_book(id));
        report(&key, result.map(Some))
    }

    pub fn refetch_book(&self, id: &str) -> FetchState<Option<Book>> {
        let key = CacheKey::new("book").param("id", id);
        let result = self.book.refresh(&key, || self.api.get_book(id));
        report(&key, result.map(Some))
    }

    /// Without a book id no request is issued.
    pub fn recommendations(
        &self,
        book_id: Option<&str>,
        num_recommendations: usize,
    ) -> FetchState<Recommendations> {
        let Some(id) = book_id else {
            return FetchState::idle();
        };
        let key = recommendations_key(id, num_recommendations);
        let result = self
            .recommendations
            .get_or_fetch(&key, || self.api.recommendations(id, num_recommendations));
        report(&key, result.map(Recommendations::from))
    }

    pub fn refetch_recommendations(
        &self,
        book_id: Option<&str>,
        num_recommendations: usize,
    ) -> FetchState<Recommendations> {
        let Some(id) = book_id else {
            return FetchState::idle();
        };
        let key = recommendations_key(id, num_recommendations);
        let result = self
            .recommendations
            .refresh(&key, || self.api.recommendations(id, num_recommendations));
        report(&key, result.map(Recommendations::from))
    }

    pub fn genres(&self) -> FetchState<Vec<String>> {
        let key = CacheKey::new("genres");
        report(&key, self.names.get_or_fetch(&key, || self.api.genres()))
    }

    pub fn authors(&self, limit: usize) -> FetchState<Vec<String>> {
        let key = CacheKey::new("authors").param("limit", limit);
        report(&key, self.names.get_or_fetch(&key, || self.api.authors(limit)))
    }

    pub fn stats(&self) -> FetchState<CatalogStats> {
        let key = CacheKey::new("stats");
        report(&key, self.stats.get_or_fetch(&key, || self.api.stats()))
    }

    /// Health is never cached.
    pub fn health(&self) -> FetchState<Option<HealthStatus>> {
        let key = CacheKey::new("health");
        report(&key, self.api.health().map(Some))
    }

    /// Free-text search. Not cached: the search screen debounces instead.
    pub fn search(&self, query: &str, limit: usize) -> FetchState<Vec<Book>> {
        let key = CacheKey::new("search").param("q", query.trim()).param("limit", limit);
        report(&key, self.api.search_books(query, limit))
    }

    /// Filter request issued directly, outside the cache.
    pub fn filter_uncached(
        &self,
        filters: &FilterOptions,
        skip: usize,
        limit: usize,
    ) -> FetchState<Vec<Book>> {
        let key = filter_key(filters, skip, limit);
        report(&key, self.api.filter_books(filters, skip, limit))
    }
}

fn books_key(skip: usize, limit: usize) -> CacheKey {
    CacheKey::new("books").param("skip", skip).param("limit", limit)
}

fn top_rated_key(min_ratings: u64, limit: usize) -> CacheKey {
    CacheKey::new("top-rated")
        .param("min_ratings", min_ratings)
        .param("limit", limit)
}

fn recommendations_key(id: &str, num_recommendations: usize) -> CacheKey {
    CacheKey::new("recommendations")
        .param("id", id)
        .param("num", num_recommendations)
}

fn filter_key(filters: &FilterOptions, skip: usize, limit: usize) -> CacheKey {
    filters
        .query_pairs()
        .into_iter()
        .fold(CacheKey::new("filter"), |key, (name, value)| key.param(name, value))
        .param("skip", skip)
        .param("limit", limit)
}

fn report<T: Default>(key: &CacheKey, result: Result<T, ApiError>) -> FetchState<T> {
    if let Err(err) = &result {
        warn!(key = %key, error = %err, "query failed");
    }
    FetchState::from_result(result)
}
