//! Wire-level request and response values.
//!
//! # Design
//! `BuiltRequest` is what a `Transport` consumes and `Response` is what it
//! produces. Both are plain data: the URL is already absolute, headers are
//! already merged, and the body is already encoded. Neither type knows how
//! it will be sent, so a test transport can inspect or fabricate them freely.

use std::fmt;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{DecodeError, Error};

/// Media type of an encoded request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Json,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
        }
    }
}

/// HTTP verb for a request. Body-bearing verbs carry the content type
/// of the body they send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post(ContentType),
    /// Partial update, sent as `PATCH`.
    Patch(ContentType),
    Put(ContentType),
    Delete,
}

impl HttpMethod {
    /// Canonical upper-case verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post(_) => "POST",
            HttpMethod::Patch(_) => "PATCH",
            HttpMethod::Put(_) => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            HttpMethod::Post(ct) | HttpMethod::Patch(ct) | HttpMethod::Put(ct) => Some(*ct),
            HttpMethod::Get | HttpMethod::Delete => None,
        }
    }

    /// Whether a payload may be attached to a request with this verb.
    pub fn accepts_body(&self) -> bool {
        self.content_type().is_some()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully materialized request, ready for a `Transport`.
///
/// Produced by `Request::build` / `Request::build_with_body`. Building the
/// same `Request` twice yields equal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl BuiltRequest {
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Header value by case-insensitive name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Raw payload bytes plus transport metadata.
///
/// The client never inspects the status or decodes the body; callers pick
/// the helpers they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 text, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into `Error::Status`, passing 2xx through.
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::Status {
            status: self.status,
            body: self.text(),
        })
    }
}
