//! Deterministic transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::HeaderValue;

use super::Transport;
use crate::error::TransportError;
use crate::http::{BuiltRequest, ContentType, Response};

/// Replays queued results in order and records every request it receives.
///
/// Clones share the same queue and log, so a test can keep one handle while
/// the client owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    results: VecDeque<Result<Response, TransportError>>,
    requests: Vec<BuiltRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: Response) -> Self {
        self.lock().results.push_back(Ok(response));
        self
    }

    /// Queue a JSON response with a matching `Content-Type` header.
    pub fn with_json(self, status: u16, body: &serde_json::Value) -> Self {
        let mut response = Response::new(status, body.to_string());
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(ContentType::Json.as_str()));
        self.with_response(response)
    }

    pub fn with_error(self, error: TransportError) -> Self {
        self.lock().results.push_back(Err(error));
        self
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<BuiltRequest> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: BuiltRequest) -> Result<Response, TransportError> {
        let mut inner = self.lock();
        inner.requests.push(request);
        inner
            .results
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no mock response queued".to_string())))
    }
}
