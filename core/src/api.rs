//! Typed facade over `BookClient` and a `Transport`.
//!
//! Each method is one round-trip: build, execute, parse. The facade is built
//! once and shared by reference; it holds no mutable state.

use crate::client::BookClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Book, CatalogStats, FilterOptions, HealthStatus, RecommendationResponse};

pub struct BookApi<T = UreqTransport> {
    client: BookClient,
    transport: T,
}

impl BookApi<UreqTransport> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_url, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> BookApi<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: BookClient::new(base_url),
            transport,
        }
    }

    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.transport.execute(&self.client.build_health())?;
        self.client.parse_health(response)
    }

    pub fn get_book(&self, id: &str) -> Result<Book, ApiError> {
        let response = self.transport.execute(&self.client.build_get_book(id))?;
        self.client.parse_book(response)
    }

    pub fn list_books(&self, skip: usize, limit: usize) -> Result<Vec<Book>, ApiError> {
        let response = self
            .transport
            .execute(&self.client.build_list_books(skip, limit))?;
        self.client.parse_books(response)
    }

    pub fn filter_books(
        &self,
        filters: &FilterOptions,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Book>, ApiError> {
        let response = self
            .transport
            .execute(&self.client.build_filter_books(filters, skip, limit))?;
        self.client.parse_books(response)
    }

    pub fn search_books(&self, query: &str, limit: usize) -> Result<Vec<Book>, ApiError> {
        let response = self
            .transport
            .execute(&self.client.build_search_books(query, limit))?;
        self.client.parse_books(response)
    }

    pub fn top_rated(&self, min_ratings: u64, limit: usize) -> Result<Vec<Book>, ApiError> {
        let response = self
            .transport
            .execute(&self.client.build_top_rated(min_ratings, limit))?;
        self.client.parse_books(response)
    }

    pub fn genres(&self) -> Result<Vec<String>, ApiError> {
        let response = self.transport.execute(&self.client.build_genres())?;
        self.client.parse_names(response)
    }

    pub fn authors(&self, limit: usize) -> Result<Vec<String>, ApiError> {
        let response = self.transport.execute(&self.client.build_authors(limit))?;
        self.client.parse_names(response)
    }

    pub fn stats(&self) -> Result<CatalogStats, ApiError> {
        let response = self.transport.execute(&self.client.build_stats())?;
        self.client.parse_stats(response)
    }

    pub fn recommendations(
        &self,
        id: &str,
        num_recommendations: usize,
    ) -> Result<RecommendationResponse, ApiError> {
        let response = self
            .transport
            .execute(&self.client.build_recommendations(id, num_recommendations))?;
        self.client.parse_recommendations(response)
    }
}
