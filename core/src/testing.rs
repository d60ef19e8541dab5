//! In-memory `Transport` for unit tests.

use std::sync::{Arc, Mutex};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Default)]
struct Inner {
    routes: Vec<(String, u16, String)>,
    requests: Vec<HttpRequest>,
}

/// Answers requests from a fixed route table keyed by URL path (without the
/// base URL or query) and records every request it receives. Unknown paths
/// get a 404. Clones share state.
#[derive(Clone, Default)]
pub struct StubTransport {
    inner: Arc<Mutex<Inner>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, status: u16, body: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .routes
            .push((path.to_string(), status, body.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.clone());
        let path = request
            .path
            .splitn(4, '/')
            .nth(3)
            .map(|p| format!("/{p}"))
            .unwrap_or_default();
        let (status, body) = inner
            .routes
            .iter()
            .find(|(route, _, _)| *route == path)
            .map(|(_, status, body)| (*status, body.clone()))
            .unwrap_or((404, String::new()));
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}
