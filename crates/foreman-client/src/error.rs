//! Error types for Foreman API calls.

/// Errors that can occur while talking to the Foreman API.
#[derive(thiserror::Error, Debug)]
pub enum ForemanError {
    /// The server answered with a status outside 200..=299.
    #[error("HTTP Error {status_line}")]
    Http { status: u16, status_line: String },

    /// Connection failure, timeout, or a body that could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The body was not JSON, or not the object shape we expect.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The search succeeded but nothing matched the query exactly.
    #[error("Resource not found: no {resource} matching '{query}'")]
    NotFound { resource: String, query: String },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForemanError {
    /// Create a not-found error for a resource query.
    pub fn not_found(resource: &str, query: &str) -> Self {
        ForemanError::NotFound {
            resource: resource.to_string(),
            query: query.to_string(),
        }
    }

    /// True for failures of the HTTP exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, ForemanError::Http { .. } | ForemanError::Network(_))
    }

    /// True for failures the search retry ladder absorbs.
    ///
    /// Decode failures happen inside the same fetch attempt as the request,
    /// so they are retried alongside transport failures.
    pub fn is_retryable(&self) -> bool {
        self.is_transport() || matches!(self, ForemanError::Decode(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ForemanError::NotFound { .. })
    }

    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForemanError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ForemanError {
    fn from(e: reqwest::Error) -> Self {
        ForemanError::Network(e.to_string())
    }
}

/// Convenience result type.
pub type ForemanResult<T> = Result<T, ForemanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_includes_status_line() {
        let err = ForemanError::Http {
            status: 404,
            status_line: "404 Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP Error 404 Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_classification() {
        let http = ForemanError::Http {
            status: 500,
            status_line: "500 Internal Server Error".to_string(),
        };
        assert!(http.is_transport());
        assert!(http.is_retryable());

        let decode = ForemanError::Decode("expected value".to_string());
        assert!(!decode.is_transport());
        assert!(decode.is_retryable());

        let missing = ForemanError::not_found("hosts", "web01");
        assert!(missing.is_not_found());
        assert!(!missing.is_retryable());
        assert_eq!(missing.status(), None);
        assert_eq!(
            missing.to_string(),
            "Resource not found: no hosts matching 'web01'"
        );
    }
}
