//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! The `Transport` trait is the only I/O seam in the crate. `UreqTransport`
//! is the production implementation; tests substitute in-memory transports.
//! Status codes are returned as data (never as transport errors) so that the
//! `BookClient::parse_*` methods own all status interpretation.

use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a single `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url();
        debug!(method = %request.method, url = %url, "API request");
        let started = Instant::now();

        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(|e| {
            let err = map_ureq_error(e);
            error!(url = %url, error = %err, "API request failed");
            err
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if (200..300).contains(&status) {
            debug!(url = %url, status, elapsed_ms, "API response");
        } else {
            warn!(url = %url, status, elapsed_ms, body = %body, "API error response");
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        other => ApiError::Transport(other.to_string()),
    }
}
