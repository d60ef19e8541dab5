//! Client core for the book recommendation service.
//!
//! # Overview
//! `BookClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. A `Transport` executes them, `BookApi`
//! ties the two together per endpoint, and `Catalog` layers keyed request
//! deduplication on top so that screens asking for the same data share one
//! round-trip. `SearchSession` debounces free-text input.
//!
//! # Design
//! - `BookClient` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the request shapes are testable as data.
//! - `Catalog` is constructed once and shared by reference (`Arc`); there
//!   is no global client.
//! - Screens consume `FetchState` values and never see `Err`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod queries;
pub mod search;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use api::BookApi;
pub use cache::{CacheKey, RequestCache};
pub use client::BookClient;
pub use config::Config;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use queries::{Catalog, FetchState, Recommendations};
pub use search::{SearchSession, SearchState};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Book, CatalogStats, FilterOptions, HealthStatus, InputBook, Recommendation,
    RecommendationResponse,
};
