//! Error types for the book API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the detail screens render a
//! "not found" state for it. All other non-2xx responses land in `Http` with
//! the raw status code and body for logging. Screens never branch on the
//! remaining variants; they see the single string from `user_message`.

use thiserror::Error;

/// Errors returned by `BookClient` parse methods and transports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404: the requested record does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS or other I/O failure before a status was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// The uniform message shown to users, regardless of failure kind.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status, .. } => format!("Request failed with status {status}"),
            ApiError::NotFound => "Request failed with status 404".to_string(),
            ApiError::Timeout | ApiError::Transport(_) => {
                "Unable to reach the book service".to_string()
            }
            ApiError::Deserialization(_) => "Received an invalid response".to_string(),
        }
    }
}

/// Errors raised while loading `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL {url:?}: must start with http:// or https://")]
    InvalidApiUrl { url: String },
}
