//! Error types for request building and dispatch.
//!
//! # Design
//! Failures fall into two tiers. `BuildError` covers everything that goes
//! wrong while turning a `Request` into a `BuiltRequest` (bad URL, bad header,
//! unserializable payload); these are caller mistakes, but they are returned
//! as values instead of aborting. `TransportError` covers the network side.
//! `Error` is the union the client returns, plus the optional status and
//! decode errors callers layer on top of a raw `Response`.

use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A `Request` could not be materialized into a `BuiltRequest`.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Scheme, host, and path did not combine into a valid absolute URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A header name or value is not valid on the wire.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("payload serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// The transport failed to produce a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport rejected the URL it was handed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Host lookup failed, or the connection was refused, reset, or
    /// aborted.
    #[error("connection error: {0}")]
    Connection(String),

    /// The request did not complete in time.
    #[error("timeout")]
    Timeout,

    /// Any other socket or stream failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A response body could not be decoded into the requested type.
#[derive(Debug, Error)]
#[error("response decoding failed: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Any failure surfaced by `Client` or by the `Response` helpers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Produced only by `Response::error_for_status`; the client forwards
    /// non-2xx responses unchanged.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl Error {
    /// True when the failure happened before anything reached the transport.
    pub fn is_build(&self) -> bool {
        matches!(self, Error::Build(_))
    }

    /// The HTTP status carried by a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
