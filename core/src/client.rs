//! Stateless HTTP request builder and response parser for the book API.
//!
//! # Design
//! `BookClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Several endpoints share a response shape (`Vec<Book>`), so they share a
//! parse method.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Book, CatalogStats, FilterOptions, HealthStatus, RecommendationResponse};

/// Synchronous, stateless client for the book API.
#[derive(Debug, Clone)]
pub struct BookClient {
    base_url: String,
}

impl BookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_health(&self) -> HttpRequest {
        self.get("/health", Vec::new())
    }

    pub fn build_list_books(&self, skip: usize, limit: usize) -> HttpRequest {
        self.get(
            "/books",
            vec![("skip", skip.to_string()), ("limit", limit.to_string())],
        )
    }

    pub fn build_get_book(&self, id: &str) -> HttpRequest {
        self.get(&format!("/books/{}", urlencoding::encode(id)), Vec::new())
    }

    pub fn build_filter_books(
        &self,
        filters: &FilterOptions,
        skip: usize,
        limit: usize,
    ) -> HttpRequest {
        let mut query = filters.query_pairs();
        query.push(("skip", skip.to_string()));
        query.push(("limit", limit.to_string()));
        self.get("/books/filter", query)
    }

    pub fn build_top_rated(&self, min_ratings: u64, limit: usize) -> HttpRequest {
        self.get(
            "/books/top-rated",
            vec![
                ("min_ratings", min_ratings.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    pub fn build_genres(&self) -> HttpRequest {
        self.get("/books/genres", Vec::new())
    }

    pub fn build_authors(&self, limit: usize) -> HttpRequest {
        self.get("/books/authors", vec![("limit", limit.to_string())])
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.get("/books/stats", Vec::new())
    }

    /// The query is sent trimmed.
    pub fn build_search_books(&self, query: &str, limit: usize) -> HttpRequest {
        self.get(
            "/search/books",
            vec![("q", query.trim().to_string()), ("limit", limit.to_string())],
        )
    }

    pub fn build_recommendations(&self, id: &str, num_recommendations: usize) -> HttpRequest {
        self.get(
            &format!("/recommendations/{}", urlencoding::encode(id)),
            vec![("num_recommendations", num_recommendations.to_string())],
        )
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        parse_json(response)
    }

    pub fn parse_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        parse_json(response)
    }

    /// Parses the list endpoints: books, filter, top-rated and search.
    pub fn parse_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        parse_json(response)
    }

    /// Parses the genre and author name lists.
    pub fn parse_names(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        parse_json(response)
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<CatalogStats, ApiError> {
        parse_json(response)
    }

    pub fn parse_recommendations(
        &self,
        response: HttpResponse,
    ) -> Result<RecommendationResponse, ApiError> {
        parse_json(response)
    }

    fn get(&self, path: &str, query: Vec<(&str, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{}", self.base_url, path),
            query: query.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            headers: json_headers(),
        }
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![
        ("accept".to_string(), "application/json".to_string()),
        ("content-type".to_string(), "application/json".to_string()),
    ]
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
