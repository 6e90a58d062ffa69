//! Scripted transport for tests.
//!
//! Replies are queued per `(method, path)`. Each call pops the next reply;
//! the last reply of a queue is sticky and answers every further call.
//! Unrouted requests get a 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::traits::transport::HttpTransport;
use quill_core::types::http::{ApiRequest, ApiResponse, HttpMethod};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub struct MockReply {
    outcome: Result<ApiResponse, AppError>,
    delay: Option<Duration>,
}

impl MockReply {
    /// Reply with `status` and an empty body.
    pub fn status(status: u16) -> Self {
        Self::response(ApiResponse::new(status, ""))
    }

    /// Reply with `status` and a JSON body.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::response(ApiResponse::json(status, &body))
    }

    /// Reply with a prepared response.
    pub fn response(response: ApiResponse) -> Self {
        Self {
            outcome: Ok(response),
            delay: None,
        }
    }

    /// Fail without a response (connection refused and the like).
    pub fn error(message: &str) -> Self {
        Self::failure(AppError::transport(message))
    }

    /// Fail with a timeout.
    pub fn timeout() -> Self {
        Self::failure(AppError::timeout("request timed out"))
    }

    /// Fail with an arbitrary error.
    pub fn failure(err: AppError) -> Self {
        Self {
            outcome: Err(err),
            delay: None,
        }
    }

    /// Hold the reply back for `delay` (tokio time, so paused clocks apply).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// In-memory [`HttpTransport`] answering from scripted replies.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<MockReply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `method path` call with `reply`, replacing prior script.
    pub fn reply(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.reply_sequence(method, path, vec![reply]);
    }

    /// Answer successive `method path` calls with `replies` in order.
    pub fn reply_sequence(&self, method: HttpMethod, path: &str, replies: Vec<MockReply>) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes.insert((method, path.to_string()), replies.into());
    }

    /// Every request executed so far.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls made to `method path`.
    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.method == method && c.path() == path)
            .count()
    }

    /// The most recent request made to `method path`.
    pub fn last_call(&self, method: HttpMethod, path: &str) -> Option<ApiRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|c| c.method == method && c.path() == path)
            .cloned()
    }

    /// Forget recorded calls, keeping the routes.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn next_reply(&self, request: &ApiRequest) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let queue = routes.get_mut(&(request.method, request.path().to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let Some(reply) = self.next_reply(request) else {
            tracing::debug!(method = %request.method, path = %request.path(), "[MockTransport] unrouted");
            return Ok(ApiResponse::new(404, ""));
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.outcome
    }
}
