//! Caller-facing operations: build a request, hand it to the transport,
//! forward the single result.
//!
//! # Design
//! `Client` holds an injected `Transport` and a `ClientConfig` and carries
//! no other state between calls. `fetch` sends a bodyless request, `send`
//! attaches an encoded payload. Neither decodes the response or interprets
//! the status code; callers layer `Response::json` and
//! `Response::error_for_status` on top as needed.

use serde::Serialize;
use tracing::{debug, debug_span, Instrument};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{BuiltRequest, Response};
use crate::request::Request;
use crate::transport::Transport;

/// Request dispatcher over an injected transport.
#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `request` without a body.
    pub async fn fetch(&self, request: &Request) -> Result<Response> {
        let built = request.build(&self.config)?;
        self.execute(built).await
    }

    /// Execute `request` with `payload` encoded as its body.
    pub async fn send<P>(&self, payload: &P, request: &Request) -> Result<Response>
    where
        P: Serialize + ?Sized,
    {
        let built = request.build_with_body(payload, &self.config)?;
        self.execute(built).await
    }

    async fn execute(&self, built: BuiltRequest) -> Result<Response> {
        let span = debug_span!("http_request", method = %built.method, url = %built.url);
        async move {
            debug!(body_len = built.body.as_ref().map_or(0, Vec::len), "sending request");
            match self.transport.execute(built).await {
                Ok(response) => {
                    debug!(status = response.status, "received response");
                    Ok(response)
                }
                Err(err) => {
                    debug!(error = %err, "transport failed");
                    Err(err.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(feature = "ureq-transport")]
impl Default for Client<crate::transport::UreqTransport> {
    fn default() -> Self {
        Self::new(crate::transport::UreqTransport::new())
    }
}
