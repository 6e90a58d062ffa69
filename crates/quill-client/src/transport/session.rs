//! Session-aware transport: one silent credential refresh per request.
//!
//! The first 401 a request receives triggers exactly one
//! `POST /auth/refresh`; when that succeeds the request is replayed once
//! and the replayed response is what the caller sees. When recovery is
//! impossible a [`TransportEvent::SessionInvalidated`] is published and
//! the failing response is returned unchanged. This layer never touches
//! session state itself.
//!
//! Invalidations are stamped with the session generation. Whoever owns
//! the session bumps it on every sign-in, so an invalidation observed
//! before a sign-in can be told apart from one that concerns it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use quill_core::events::TransportEvent;
use quill_core::result::AppResult;
use quill_core::traits::transport::HttpTransport;
use quill_core::types::http::{ApiRequest, ApiResponse};

/// How a request reacts to unauthorized responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPolicy {
    /// No interception. Credential endpoints use this so a rejected
    /// password is reported as-is instead of triggering a refresh.
    Public,
    /// Refresh once on 401. A 403 is returned without side effects.
    Authenticated,
    /// Refresh once on 401, and treat 403 as a lost session.
    SessionBound,
}

impl RequestPolicy {
    fn refreshes(self) -> bool {
        !matches!(self, Self::Public)
    }

    fn invalidate_on_forbidden(self) -> bool {
        matches!(self, Self::SessionBound)
    }
}

/// Transport wrapper applying [`RequestPolicy`] and publishing
/// [`TransportEvent`]s.
#[derive(Debug, Clone)]
pub struct SessionTransport {
    inner: Arc<dyn HttpTransport>,
    refresh_url: String,
    events: broadcast::Sender<TransportEvent>,
    generation: Arc<AtomicU64>,
}

impl SessionTransport {
    /// Wrap `inner`. `refresh_url` is the absolute URL of the refresh
    /// endpoint; it is always called on `inner` directly.
    pub fn new(
        inner: Arc<dyn HttpTransport>,
        refresh_url: impl Into<String>,
        event_buffer: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            inner,
            refresh_url: refresh_url.into(),
            events,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new session generation and return it.
    pub fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Receive transport events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    /// Execute `request` and require a 2xx response.
    pub async fn send(&self, request: ApiRequest, policy: RequestPolicy) -> AppResult<ApiResponse> {
        self.send_raw(request, policy).await?.error_for_status()
    }

    /// Execute `request` under `policy` and return the final response
    /// whatever its status. `Err` means no response was received.
    pub async fn send_raw(
        &self,
        request: ApiRequest,
        policy: RequestPolicy,
    ) -> AppResult<ApiResponse> {
        let response = self.inner.execute(&request).await?;

        if !policy.refreshes() {
            return Ok(response);
        }

        match response.status {
            401 => self.refresh_and_retry(&request, response).await,
            403 if policy.invalidate_on_forbidden() => {
                self.publish_invalidated(&request, 403);
                Ok(response)
            }
            _ => Ok(response),
        }
    }

    async fn refresh_and_retry(
        &self,
        request: &ApiRequest,
        original: ApiResponse,
    ) -> AppResult<ApiResponse> {
        debug!(path = %request.path(), "Unauthorized response, attempting credential refresh");

        if !self.refresh().await {
            self.publish_invalidated(request, original.status);
            return Ok(original);
        }
        let _ = self.events.send(TransportEvent::Refreshed);

        let retried = match self.inner.execute(request).await {
            Ok(retried) => retried,
            Err(e) => {
                warn!(path = %request.path(), error = %e, "Retry after refresh failed to send");
                return Err(e);
            }
        };

        if matches!(retried.status, 401 | 403) {
            self.publish_invalidated(request, retried.status);
        }
        Ok(retried)
    }

    async fn refresh(&self) -> bool {
        let request = ApiRequest::post(self.refresh_url.clone());
        match self.inner.execute(&request).await {
            Ok(response) if response.is_success() => {
                info!("Session credential refreshed");
                true
            }
            Ok(response) => {
                warn!(status = response.status, "Credential refresh rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "Credential refresh failed");
                false
            }
        }
    }

    fn publish_invalidated(&self, request: &ApiRequest, status: u16) {
        warn!(status, path = %request.path(), "Session invalidated by server response");
        // No receivers is fine; nobody is tracking a session.
        let _ = self.events.send(TransportEvent::SessionInvalidated {
            status,
            path: request.path().to_string(),
            generation: self.generation(),
        });
    }
}
