use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable selecting the backend base URL.
pub const API_URL_ENV: &str = "BOOKREC_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_FILTER_LIMIT: usize = 50;
pub const DEFAULT_AUTHORS_LIMIT: usize = 100;
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

pub const BOOKS_FRESHNESS: Duration = Duration::from_secs(60);
pub const TOP_RATED_FRESHNESS: Duration = Duration::from_secs(300);
pub const RECOMMENDATIONS_FRESHNESS: Duration = Duration::from_secs(300);
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(2);

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const SEARCH_MIN_QUERY_LEN: usize = 1;

/// Client configuration. Only the base URL is runtime surface; the rest
/// are the compiled-in defaults above.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = api_url.trim();
        let host = api_url
            .strip_prefix("http://")
            .or_else(|| api_url.strip_prefix("https://"))
            .and_then(|rest| rest.split('/').next());
        if host.map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidApiUrl {
                url: api_url.to_string(),
            });
        }
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Load configuration from the environment.
    ///
    /// Optional:
    /// - `BOOKREC_API_URL`: backend base URL (default `http://localhost:8000`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&url)
    }
}
