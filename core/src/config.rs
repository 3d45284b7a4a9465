//! Client-wide request defaults.

/// Host used when neither the request nor the config names one.
pub const DEFAULT_HOST: &str = "api.somehost.com";

pub const DEFAULT_SCHEME: &str = "https";

/// Defaults applied by `Request::build` to every request.
///
/// `host` is a bare host with an optional port. An API version prefix such
/// as `/v1` belongs in each `Request` path (`/v1/users/1337`); a host that
/// carries a path fails to build with `BuildError::InvalidUrl`.
///
/// Header precedence, lowest first: `user_agent`, `default_headers`, the
/// request's own headers, then the fixed `Accept` and `Content-Type` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub scheme: String,
    pub host: String,
    pub default_headers: Vec<(String, String)>,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            default_headers: Vec::new(),
            user_agent: Some(concat!("apiwire/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl ClientConfig {
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Host, optionally with a port (`127.0.0.1:3000`).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn without_user_agent(mut self) -> Self {
        self.user_agent = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_https_api_host() {
        let config = ClientConfig::default();
        assert_eq!(config.scheme, "https");
        assert_eq!(config.host, "api.somehost.com");
        assert!(config.default_headers.is_empty());
        assert!(config.user_agent.as_deref().unwrap().starts_with("apiwire/"));
    }

    #[test]
    fn version_prefix_goes_in_the_request_path() {
        let config = ClientConfig::default();
        let built = crate::Request::get("/v1/users/1337").build(&config).unwrap();
        assert_eq!(built.url.as_str(), "https://api.somehost.com/v1/users/1337");
        assert_eq!(built.path(), "/v1/users/1337");

        let err = crate::Request::get("/users/1337")
            .build(&config.with_host("api.somehost.com/v1"))
            .unwrap_err();
        assert!(matches!(err, crate::BuildError::InvalidUrl { .. }));
    }

    #[test]
    fn builders_accumulate_headers_in_order() {
        let config = ClientConfig::default()
            .with_scheme("http")
            .with_host("127.0.0.1:3000")
            .with_default_header("X-Client", "tests")
            .with_default_header("X-Trace", "on")
            .without_user_agent();
        assert_eq!(config.scheme, "http");
        assert_eq!(config.host, "127.0.0.1:3000");
        assert_eq!(
            config.default_headers,
            vec![
                ("X-Client".to_string(), "tests".to_string()),
                ("X-Trace".to_string(), "on".to_string()),
            ]
        );
        assert_eq!(config.user_agent, None);
    }
}
