//! Blocking `ureq` agent driven from the tokio blocking pool.

use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use super::Transport;
use crate::error::TransportError;
use crate::http::{BuiltRequest, HttpMethod, Response};

/// Default network transport.
///
/// Status codes are never turned into errors; a 404 comes back as a
/// `Response` with `status == 404`. Must be awaited inside a tokio runtime.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    timeout: Option<Duration>,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Caps the whole exchange (connect, send, receive) at `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent, timeout }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: BuiltRequest) -> Result<Response, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || call(&agent, &request))
            .await
            .map_err(|e| TransportError::Other(format!("transport task failed: {e}")))?
    }
}

fn call(agent: &Agent, request: &BuiltRequest) -> Result<Response, TransportError> {
    let url = request.url.as_str();
    let body = request.body.as_deref();

    let mut response = match request.method {
        HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
        HttpMethod::Post(_) => send(with_headers(agent.post(url), &request.headers), body),
        HttpMethod::Patch(_) => send(with_headers(agent.patch(url), &request.headers), body),
        HttpMethod::Put(_) => send(with_headers(agent.put(url), &request.headers), body),
    }
    .map_err(transport_error)?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.body_mut().read_to_vec().map_err(transport_error)?;

    Ok(Response {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &HeaderMap) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&[u8]>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

fn transport_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(e) if is_connection_failure(e.kind()) => TransportError::Connection(e.to_string()),
        ureq::Error::Io(e) => TransportError::Io(e),
        ureq::Error::BadUri(uri) => TransportError::InvalidUrl(uri),
        e @ (ureq::Error::HostNotFound | ureq::Error::ConnectionFailed) => {
            TransportError::Connection(e.to_string())
        }
        other => TransportError::Other(other.to_string()),
    }
}

fn is_connection_failure(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
    )
}
