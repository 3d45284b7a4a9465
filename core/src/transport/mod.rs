//! The seam between building a request and putting it on the network.
//!
//! # Design
//! `Client` owns a value implementing `Transport` and hands it one
//! `BuiltRequest` per call. Swapping the transport at construction time is
//! the only way to change how requests are executed; there is no global
//! registry to patch. Implementations must return exactly one result per
//! call and must not retry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{BuiltRequest, Response};

mod mock;
#[cfg(feature = "ureq-transport")]
mod blocking;

pub use mock::MockTransport;
#[cfg(feature = "ureq-transport")]
pub use blocking::UreqTransport;

/// Sends a built request and yields the response or a transport failure.
///
/// Non-2xx statuses are responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: BuiltRequest) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: BuiltRequest) -> Result<Response, TransportError> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(&self, request: BuiltRequest) -> Result<Response, TransportError> {
        (**self).execute(request).await
    }
}
