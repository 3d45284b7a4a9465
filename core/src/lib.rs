//! Request building and transport-agnostic dispatch for a JSON HTTP API.
//!
//! # Overview
//! A `Request` describes one call (path, verb, query, headers). `Request::build`
//! turns it into a `BuiltRequest` with an absolute URL, merged headers, and an
//! optional JSON body. `Client` hands built requests to an injected
//! `Transport` and forwards the single result it gets back.
//!
//! # Design
//! - Building is pure and returns `BuildError` instead of aborting on a bad
//!   URL, header, or payload.
//! - The transport is a trait object chosen at construction time. Tests use
//!   `MockTransport`; production uses `UreqTransport` (feature
//!   `ureq-transport`, on by default).
//! - The client never decodes bodies or treats non-2xx statuses as failures.
//!   `Response::json` and `Response::error_for_status` are opt-in helpers.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_HOST};
pub use error::{BuildError, DecodeError, Error, Result, TransportError};
pub use crate::http::{BuiltRequest, ContentType, HttpMethod, Response};
pub use request::{QueryItem, Request};
pub use transport::{MockTransport, Transport};
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
