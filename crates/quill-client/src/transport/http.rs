//! reqwest-backed transport with a shared cookie jar.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Method, Url};
use tracing::debug;

use quill_core::error::{AppError, ErrorKind};
use quill_core::result::AppResult;
use quill_core::traits::transport::HttpTransport;
use quill_core::types::http::{ApiRequest, ApiResponse, HttpMethod};

/// Transport executing requests with one [`reqwest::Client`].
///
/// The client keeps a cookie store, so the `HttpOnly` session cookie set
/// by the auth service is sent to every service sharing the domain.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given default request timeout and an
    /// in-memory cookie jar.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Self::build(reqwest::Client::builder().cookie_store(true), timeout)
    }

    /// Build a transport whose cookies live in `jar`.
    pub fn with_cookie_jar(timeout: Duration, jar: Arc<Jar>) -> AppResult<Self> {
        Self::build(reqwest::Client::builder().cookie_provider(jar), timeout)
    }

    fn build(builder: reqwest::ClientBuilder, timeout: Duration) -> AppResult<Self> {
        let client = builder
            .timeout(timeout)
            .user_agent(concat!("quill/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self { client })
    }

    fn build_url(request: &ApiRequest) -> AppResult<Url> {
        let mut url = Url::parse(&request.url)
            .map_err(|e| AppError::configuration(format!("Invalid URL '{}': {e}", request.url)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };
        let url = Self::build_url(request)?;

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_send_error)?;

        debug!(
            method = %request.method,
            path = %request.path(),
            status,
            "HTTP request completed"
        );

        Ok(ApiResponse::new(status, body))
    }
}

fn map_send_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        return AppError::with_source(ErrorKind::Timeout, format!("Request timed out: {err}"), err);
    }
    let message = if err.is_connect() {
        format!("Connection failed: {err}")
    } else {
        format!("Request failed: {err}")
    };
    AppError::with_source(ErrorKind::Transport, message, err)
}
