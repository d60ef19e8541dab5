//! Domain DTOs for the book recommendation API.
//!
//! # Design
//! These types mirror the backend's JSON schema but are defined independently
//! of the mock-server crate. Book fields use the backend's camelCase names
//! while the recommendation envelope and filter parameters are snake_case,
//! so the serde attributes differ per type. Integration tests catch any
//! schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// A single book record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl Book {
    /// Year of publication, taken from the leading four digits of
    /// `published_date` (`"1965-08-01"`, `"1965"`).
    pub fn published_year(&self) -> Option<i32> {
        let date = self.published_date.as_deref()?.trim();
        let digits = date.get(..4)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// A recommended book together with its relevance score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub book: Book,
    pub score: f64,
}

impl Recommendation {
    /// Score rendered as a whole percentage.
    pub fn match_percent(&self) -> u32 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Abbreviated description of the book recommendations were computed for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InputBook {
    pub book_id: String,
    pub title: String,
    pub author: String,
}

/// Envelope returned by `GET /recommendations/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub input_book: InputBook,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub total_recommendations: usize,
}

/// Optional filter criteria for `GET /books/filter`. Every present field is
/// passed through verbatim as a query parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ratings_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
}

impl FilterOptions {
    /// True when no criterion is set. Blank strings count as absent.
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Present criteria as `(name, value)` query pairs, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.min_rating {
            pairs.push(("min_rating", v.to_string()));
        }
        if let Some(v) = self.max_rating {
            pairs.push(("max_rating", v.to_string()));
        }
        if let Some(v) = non_blank(&self.genre) {
            pairs.push(("genre", v.to_string()));
        }
        if let Some(v) = non_blank(&self.author) {
            pairs.push(("author", v.to_string()));
        }
        if let Some(v) = self.min_ratings_count {
            pairs.push(("min_ratings_count", v.to_string()));
        }
        if let Some(v) = self.published_year {
            pairs.push(("published_year", v.to_string()));
        }
        pairs
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Aggregate catalog statistics. The backend decides the shape, so the
/// object is carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CatalogStats(pub serde_json::Map<String, serde_json::Value>);

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}
