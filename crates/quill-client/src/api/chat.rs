//! Chatbot client.
//!
//! The chatbot answers slowly and fails often; callers always get text
//! to show, never an error.

use std::time::Duration;

use tracing::{error, warn};

use quill_core::error::ErrorKind;
use quill_core::types::ApiRequest;

use crate::dto::{ChatRequest, ChatResponse};
use crate::transport::{RequestPolicy, SessionTransport};

/// Shown when the gateway cannot reach the chatbot.
pub const GATEWAY_UNAVAILABLE: &str =
    "The chat server (502) is unreachable. Check that the API gateway and the chat service are running.";
/// Shown when the answer took too long.
pub const TIMED_OUT: &str = "The response took too long. Please try again.";
/// Shown for any other communication failure.
pub const UNREACHABLE: &str = "Could not reach the chat server, or a communication error occurred.";
/// Shown when a 200 answer carries no text.
pub const NO_ANSWER: &str = "No response was received.";

/// Client for the chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatApi {
    transport: SessionTransport,
    url: String,
    timeout: Duration,
}

impl ChatApi {
    /// Create a client posting to `url` with `timeout` per message.
    pub fn new(transport: SessionTransport, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            url: url.into(),
            timeout,
        }
    }

    /// Send `message` in conversation `session_id` and return the text to display.
    pub async fn send(&self, session_id: &str, message: &str) -> String {
        let body = ChatRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
        };
        let request = match ApiRequest::post(self.url.clone()).json(&body) {
            Ok(request) => request.timeout(self.timeout),
            Err(e) => {
                error!(error = %e, "Failed to encode chat request");
                return UNREACHABLE.to_string();
            }
        };

        let response = match self.transport.send_raw(request, RequestPolicy::Public).await {
            Ok(response) => response,
            Err(e) if e.kind == ErrorKind::Timeout => {
                warn!(error = %e, "Chat request timed out");
                return TIMED_OUT.to_string();
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                return UNREACHABLE.to_string();
            }
        };

        match response.status {
            200 => response
                .decode::<ChatResponse>()
                .ok()
                .and_then(|r| r.response)
                .unwrap_or_else(|| NO_ANSWER.to_string()),
            502 => GATEWAY_UNAVAILABLE.to_string(),
            504 => TIMED_OUT.to_string(),
            status => {
                warn!(status, body = %response.body, "Chat service error");
                format!("Chat server error ({status}). Please try again shortly.")
            }
        }
    }
}
