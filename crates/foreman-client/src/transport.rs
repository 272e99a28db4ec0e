//! Authenticated JSON requests against the Foreman API.

use std::fmt;
use std::io;
use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::envelope::Object;
use crate::error::{ForemanError, ForemanResult};

const JSON_MEDIA_TYPE: &str = "application/json";

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Sends one request and decodes the response object.
///
/// `path` is relative to the API base URL and may carry a query string.
pub trait Transport: Send + Sync {
    fn request(&self, method: Method, path: &str, body: Option<&[u8]>) -> ForemanResult<Object>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn request(&self, method: Method, path: &str, body: Option<&[u8]>) -> ForemanResult<Object> {
        (**self).request(method, path, body)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(&self, method: Method, path: &str, body: Option<&[u8]>) -> ForemanResult<Object> {
        (**self).request(method, path, body)
    }
}

/// [`Transport`] over a pooled blocking `reqwest` client.
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Build the connection layer once for the given settings.
    ///
    /// With TLS verification disabled, certificates are not validated at all.
    pub fn new(config: Arc<ClientConfig>) -> ForemanResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()
            .map_err(|e| ForemanError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Settings this transport sends requests with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared handle to the same settings.
    pub fn shared_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }
}

impl Transport for HttpTransport {
    fn request(&self, method: Method, path: &str, body: Option<&[u8]>) -> ForemanResult<Object> {
        let url = self.config.url_for(path);
        tracing::debug!(%method, %url, "Foreman request");

        let mut builder = self
            .client
            .request(method.into(), &url)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(AUTHORIZATION, self.config.auth_header());
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_LENGTH, body.len().to_string())
                .body(body.to_vec());
        }

        let response = builder.send().map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "Foreman request failed");
            ForemanError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            drain(response);
            tracing::warn!(%method, %url, status = status.as_u16(), "Foreman returned an error status");
            return Err(ForemanError::Http {
                status: status.as_u16(),
                status_line: status.to_string(),
            });
        }

        let bytes = response.bytes()?;
        let object = decode_object(&bytes)?;
        tracing::debug!(%method, %url, status = status.as_u16(), "Foreman response decoded");
        Ok(object)
    }
}

/// Read and discard the rest of a response so its connection returns to the pool.
fn drain(mut response: Response) {
    let _ = io::copy(&mut response, &mut io::sink());
}

/// Decode a response body that must be a JSON object.
pub(crate) fn decode_object(bytes: &[u8]) -> ForemanResult<Object> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ForemanError::Decode(format!("invalid JSON body: {e}")))?;
    match value {
        Value::Object(object) => Ok(object),
        other => Err(ForemanError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
