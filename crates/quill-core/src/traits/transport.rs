//! HTTP transport trait for pluggable request execution.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::http::{ApiRequest, ApiResponse};

/// Executes requests against the backend services.
///
/// Implementations attach the session credential (cookie) automatically.
/// Any HTTP status, including 4xx and 5xx, is returned as `Ok`; `Err` is
/// reserved for requests that produced no response at all (connection
/// failure, timeout), which callers see as `ErrorKind::Transport`.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Execute a single request.
    async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse>;
}
