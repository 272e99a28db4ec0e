//! Connection settings for a Foreman server.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ForemanError, ForemanResult};

/// Default per-request timeout of the HTTP connection layer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable connection settings.
///
/// The `Authorization` header value is derived once here and reused by
/// every request the transport sends.
#[derive(Clone)]
pub struct ClientConfig {
    host: String,
    username: String,
    verify_tls: bool,
    timeout: Duration,
    base_url: String,
    auth_header: String,
}

impl ClientConfig {
    /// Settings for `https://<host>/api/` with TLS verification disabled.
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            verify_tls: false,
            timeout: DEFAULT_TIMEOUT,
            base_url: format!("https://{host}/api/"),
            auth_header: basic_auth(username, password),
        }
    }

    /// Enable or disable certificate validation.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Per-request timeout of the connection layer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the derived base URL, e.g. for a plain-HTTP proxy.
    ///
    /// A trailing `/` is appended when missing so that request paths can be
    /// concatenated directly.
    pub fn with_base_url(mut self, base_url: &str) -> ForemanResult<Self> {
        url::Url::parse(base_url)
            .map_err(|e| ForemanError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.base_url = base;
        Ok(self)
    }

    /// Server host name as given.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// API user.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether certificates are validated.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// API root, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Precomputed `Basic <base64(username:password)>` header value.
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    /// Full URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("foreman.example.com", "admin", "secret");
        assert_eq!(config.base_url(), "https://foreman.example.com/api/");
        assert!(!config.verify_tls());
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.host(), "foreman.example.com");
        assert_eq!(config.username(), "admin");
    }

    #[test]
    fn test_auth_header() {
        let config = ClientConfig::new("foreman", "admin", "secret");
        assert_eq!(config.auth_header(), "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_url_for() {
        let config = ClientConfig::new("foreman", "admin", "secret");
        assert_eq!(
            config.url_for("hosts?search=web&per_page=10000"),
            "https://foreman/api/hosts?search=web&per_page=10000"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = ClientConfig::new("foreman", "admin", "secret")
            .with_base_url("http://127.0.0.1:8080/api")
            .unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080/api/");
        assert_eq!(config.url_for("hosts"), "http://127.0.0.1:8080/api/hosts");
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let err = ClientConfig::new("foreman", "admin", "secret")
            .with_base_url("not a url")
            .unwrap_err();
        assert!(matches!(err, ForemanError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ClientConfig::new("foreman", "admin", "hunter2");
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("YWRtaW46"));
        assert!(printed.contains("<redacted>"));
    }
}
