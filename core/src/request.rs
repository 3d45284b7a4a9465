//! Outbound call descriptions and the pure builder that materializes them.
//!
//! # Design
//! A `Request` names a path, a verb, query items, and caller headers. It says
//! nothing about the body: the payload is handed to `build_with_body` (or to
//! `Client::send`) separately, so a single `Request` value can be reused for
//! many payloads. Building is synchronous and side-effect free apart from a
//! warning log when a payload is dropped.

use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::config::ClientConfig;
use crate::error::BuildError;
use crate::http::{BuiltRequest, ContentType, HttpMethod};

/// One `name[=value]` pair of a URL query. A `None` value renders as a bare
/// key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

impl QueryItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Description of one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute path, starting with `/`.
    pub path: String,
    /// Overrides `ClientConfig::host` for this request only.
    pub host: Option<String>,
    pub method: HttpMethod,
    pub query_items: Option<Vec<QueryItem>>,
    /// Caller headers, applied in order on top of the config defaults.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// A `GET` request for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            host: None,
            method: HttpMethod::Get,
            query_items: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(path).method(HttpMethod::Post(ContentType::Json))
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(path).method(HttpMethod::Put(ContentType::Json))
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(path).method(HttpMethod::Patch(ContentType::Json))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(path).method(HttpMethod::Delete)
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_items
            .get_or_insert_with(Vec::new)
            .push(QueryItem::new(name, value));
        self
    }

    pub fn query_flag(mut self, name: impl Into<String>) -> Self {
        self.query_items
            .get_or_insert_with(Vec::new)
            .push(QueryItem::flag(name));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Materialize the request without a body.
    pub fn build(&self, config: &ClientConfig) -> Result<BuiltRequest, BuildError> {
        Ok(BuiltRequest {
            url: self.url(config)?,
            method: self.method,
            headers: self.merged_headers(config)?,
            body: None,
        })
    }

    /// Materialize the request with `payload` encoded as its body.
    ///
    /// Verbs without a body (`GET`, `DELETE`) ignore the payload entirely;
    /// it is never serialized.
    pub fn build_with_body<P>(&self, payload: &P, config: &ClientConfig) -> Result<BuiltRequest, BuildError>
    where
        P: Serialize + ?Sized,
    {
        let mut built = self.build(config)?;
        match self.method.content_type() {
            Some(ContentType::Json) => {
                built.body = Some(serde_json::to_vec(payload).map_err(BuildError::Serialization)?);
            }
            None => {
                warn!(method = %self.method, path = %self.path, "payload ignored for method without a body");
            }
        }
        Ok(built)
    }

    fn url(&self, config: &ClientConfig) -> Result<Url, BuildError> {
        let host = self.host.as_deref().unwrap_or(&config.host);
        let base = format!("{}://{}", config.scheme, host);
        let invalid = |reason: &str| BuildError::InvalidUrl {
            url: format!("{base}{}", self.path),
            reason: reason.to_string(),
        };

        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(invalid("path must start with '/'"));
        }
        if self.path.split(['/', '\\']).any(is_dot_segment) {
            return Err(invalid("path must not contain dot segments"));
        }
        let mut url = Url::parse(&base).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if !url.has_host() || url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("host must be a bare host name with an optional port"));
        }

        url.set_path(&self.path);
        if let Some(items) = self.query_items.as_deref().filter(|items| !items.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for item in items {
                match &item.value {
                    Some(value) => pairs.append_pair(&item.name, value),
                    None => pairs.append_key_only(&item.name),
                };
            }
        }
        Ok(url)
    }

    fn merged_headers(&self, config: &ClientConfig) -> Result<HeaderMap, BuildError> {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = &config.user_agent {
            insert_header(&mut headers, USER_AGENT.as_str(), user_agent)?;
        }
        for (name, value) in config.default_headers.iter().chain(&self.headers) {
            insert_header(&mut headers, name, value)?;
        }
        headers.insert(ACCEPT, HeaderValue::from_static(ContentType::Json.as_str()));
        if let Some(content_type) = self.method.content_type() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        }
        Ok(headers)
    }
}

/// `.` and `..`, including their percent-encoded spellings, which the URL
/// parser would otherwise collapse into a different path.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e." | ".%2e" | "%2e%2e"
    )
}

/// Insert replacing any earlier value for the same (case-insensitive) name.
fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), BuildError> {
    let invalid = |reason: String| BuildError::InvalidHeader {
        name: name.to_string(),
        reason,
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    headers.insert(header_name, header_value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::ser::Error as _;
    use serde::{Serialize, Serializer};

    #[derive(Serialize)]
    struct Story {
        id: u64,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::default()
    }

    #[rstest]
    #[case::get(HttpMethod::Get)]
    #[case::delete(HttpMethod::Delete)]
    fn bodyless_verbs_build_without_body(#[case] method: HttpMethod) {
        let token = format!("Bearer {}", uuid::Uuid::new_v4());
        let req = Request::new("/mock-user/1337")
            .method(method)
            .header("Authorization", token.clone());

        let built = req.build_with_body(&Story { id: 1337 }, &config()).unwrap();
        assert_eq!(built.path(), "/mock-user/1337");
        assert_eq!(built.method.as_str(), method.as_str());
        assert_eq!(built.header("Authorization"), Some(token.as_str()));
        assert_eq!(built.header("Content-Type"), None);
        assert!(built.body.is_none());
    }

    #[rstest]
    #[case::post(HttpMethod::Post(ContentType::Json))]
    #[case::patch(HttpMethod::Patch(ContentType::Json))]
    #[case::put(HttpMethod::Put(ContentType::Json))]
    fn body_verbs_encode_payload(#[case] method: HttpMethod) {
        let token = format!("Bearer {}", uuid::Uuid::new_v4());
        let story = Story { id: 1337 };
        let req = Request::new("/mock-story/1337")
            .method(method)
            .header("Authorization", token.clone());

        let built = req.build_with_body(&story, &config()).unwrap();
        assert_eq!(built.path(), "/mock-story/1337");
        assert_eq!(built.method.as_str(), method.as_str());
        assert_eq!(built.body, Some(serde_json::to_vec(&story).unwrap()));
        assert_eq!(built.body.as_deref(), Some(br#"{"id":1337}"#.as_slice()));
        assert_eq!(built.header("Content-Type"), Some("application/json"));
        assert_eq!(built.header("Authorization"), Some(token.as_str()));
    }

    #[test]
    fn get_request_matches_expected_wire_shape() {
        let built = Request::get("/users/1337")
            .header("Authorization", "Bearer X")
            .build(&config())
            .unwrap();
        assert_eq!(built.url.as_str(), "https://api.somehost.com/users/1337");
        assert_eq!(built.method.as_str(), "GET");
        assert_eq!(built.header("authorization"), Some("Bearer X"));
        assert_eq!(built.header("Accept"), Some("application/json"));
        assert!(built.body.is_none());
    }

    #[test]
    fn caller_headers_override_defaults() {
        let config = config()
            .with_default_header("Authorization", "Bearer default")
            .with_default_header("X-Client", "apiwire");
        let built = Request::get("/users/1")
            .header("authorization", "Bearer caller")
            .build(&config)
            .unwrap();
        assert_eq!(built.header("Authorization"), Some("Bearer caller"));
        assert_eq!(built.header("X-Client"), Some("apiwire"));
        assert_eq!(built.headers.get_all("authorization").iter().count(), 1);
    }

    #[test]
    fn accept_and_content_type_are_always_json() {
        let built = Request::post("/stories")
            .header("Accept", "text/html")
            .header("Content-Type", "text/plain")
            .build(&config())
            .unwrap();
        assert_eq!(built.header("Accept"), Some("application/json"));
        assert_eq!(built.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn user_agent_can_be_overridden_or_removed() {
        let built = Request::get("/").build(&config()).unwrap();
        assert!(built.header("User-Agent").unwrap().starts_with("apiwire/"));

        let built = Request::get("/")
            .header("User-Agent", "custom/1.0")
            .build(&config())
            .unwrap();
        assert_eq!(built.header("User-Agent"), Some("custom/1.0"));

        let built = Request::get("/").build(&config().without_user_agent()).unwrap();
        assert_eq!(built.header("User-Agent"), None);
    }

    #[test]
    fn query_items_keep_order_and_encoding() {
        let built = Request::get("/search")
            .query("q", "rust & c")
            .query("page", "2")
            .query_flag("verbose")
            .build(&config())
            .unwrap();
        assert_eq!(built.url.query(), Some("q=rust+%26+c&page=2&verbose"));
        assert_eq!(built.path(), "/search");
    }

    #[test]
    fn empty_query_items_add_no_query() {
        let mut req = Request::get("/search");
        req.query_items = Some(Vec::new());
        let built = req.build(&config()).unwrap();
        assert_eq!(built.url.query(), None);
    }

    #[test]
    fn request_host_overrides_config_host() {
        let built = Request::get("/health")
            .host("status.somehost.com")
            .build(&config())
            .unwrap();
        assert_eq!(built.url.as_str(), "https://status.somehost.com/health");
    }

    #[test]
    fn host_with_port_and_http_scheme() {
        let config = config().with_scheme("http").with_host("127.0.0.1:3000");
        let built = Request::get("/users/1").build(&config).unwrap();
        assert_eq!(built.url.as_str(), "http://127.0.0.1:3000/users/1");
    }

    #[test]
    fn relative_path_is_invalid_url() {
        let err = Request::get("users/1").build(&config()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidUrl { .. }));
    }

    #[rstest]
    #[case::parent("/stories/../admin")]
    #[case::current("/a/./b")]
    #[case::trailing_parent("/stories/..")]
    #[case::encoded_parent("/stories/%2E%2e/admin")]
    #[case::backslash_parent("/stories\\..\\admin")]
    fn dot_segments_are_invalid_url(#[case] path: &str) {
        let err = Request::get(path).build(&config()).unwrap_err();
        assert!(
            matches!(err, BuildError::InvalidUrl { ref reason, .. } if reason == "path must not contain dot segments"),
            "{path}: {err:?}"
        );
    }

    #[test]
    fn dots_inside_segments_are_kept() {
        let built = Request::get("/files/v1.2/..hidden").build(&config()).unwrap();
        assert_eq!(built.path(), "/files/v1.2/..hidden");
    }

    #[test]
    fn bad_host_is_invalid_url() {
        let err = Request::get("/users/1")
            .host("bad host")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidUrl { .. }));
    }

    #[test]
    fn host_with_path_is_invalid_url() {
        let err = Request::get("/users/1")
            .host("api.somehost.com/v1")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidUrl { .. }));
    }

    #[test]
    fn unsupported_scheme_is_invalid_url() {
        let err = Request::get("/users/1")
            .build(&config().with_scheme("ftp"))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidUrl { .. }));
    }

    #[test]
    fn invalid_header_name_is_reported() {
        let err = Request::get("/users/1")
            .header("Bad Header", "x")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader { ref name, .. } if name == "Bad Header"));
    }

    #[test]
    fn invalid_header_value_is_reported() {
        let err = Request::get("/users/1")
            .header("X-Note", "line\nbreak")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader { .. }));
    }

    #[test]
    fn serialization_failure_is_reported() {
        let err = Request::post("/stories")
            .build_with_body(&Unserializable, &config())
            .unwrap_err();
        assert!(matches!(err, BuildError::Serialization(_)));
    }

    #[test]
    fn bodyless_verb_never_serializes_payload() {
        let built = Request::delete("/stories/1")
            .build_with_body(&Unserializable, &config())
            .unwrap();
        assert!(built.body.is_none());
    }

    #[test]
    fn building_twice_is_identical() {
        let req = Request::put("/stories/7")
            .query("draft", "true")
            .header("Authorization", "Bearer X");
        let story = Story { id: 7 };
        let first = req.build_with_body(&story, &config()).unwrap();
        let second = req.build_with_body(&story, &config()).unwrap();
        assert_eq!(first, second);
    }
}
