//! Transport-neutral HTTP request and response types.
//!
//! API clients describe requests with [`ApiRequest`] and receive
//! [`ApiResponse`] values from whatever [`HttpTransport`] is wired in,
//! which keeps the clients testable without a network.
//!
//! [`HttpTransport`]: crate::traits::HttpTransport

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// HTTP method subset used by the backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request to one of the backend services.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Per-request timeout overriding the transport default.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request without body or query.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append several query parameters.
    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> AppResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Override the timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The URL path, used for logging and for matching in tests.
    pub fn path(&self) -> &str {
        match self.url.find("://") {
            Some(scheme_end) => {
                let rest = &self.url[scheme_end + 3..];
                rest.find('/').map_or("/", |i| &rest[i..])
            }
            None => &self.url,
        }
    }
}

/// A response received from a backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a response with a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-success response into the matching [`AppError`].
    pub fn error_for_status(self) -> AppResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = error_message(&self.body)
                .unwrap_or_else(|| format!("request failed with HTTP {}", self.status));
            Err(AppError::from_status(self.status, message))
        }
    }

    /// Decode the JSON body.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Serialization,
                format!("Unexpected response body (HTTP {}): {e}", self.status),
                e,
            )
        })
    }

    /// Decode the JSON body, treating an empty body as `None`.
    pub fn decode_optional<T: DeserializeOwned>(&self) -> AppResult<Option<T>> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        self.decode().map(Some)
    }
}

/// Extract a human-readable message from an error body.
///
/// Services answer either with a JSON object carrying `message`/`error`
/// or with a bare string.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["message", "error", "detail"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string),
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}
