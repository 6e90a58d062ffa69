//! Backend health overview.
//!
//! Each service is checked with one cheap public request. A check never
//! fails; it reports what it saw.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use quill_core::types::{ApiRequest, ApiResponse};

use super::endpoint;
use crate::transport::{RequestPolicy, SessionTransport};

/// Outcome of one service check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// Answered as expected.
    Up,
    /// Answered, but with an error or an unhealthy report.
    Down,
    /// No answer at all (connection error or timeout).
    Unreachable,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
            Self::Unreachable => write!(f, "UNREACHABLE"),
        }
    }
}

/// Health of one backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Display name.
    pub name: String,
    /// Path that was requested.
    pub path: String,
    /// Outcome.
    pub status: HealthStatus,
    /// Short explanation.
    pub message: String,
}

/// `{"status": "..."}` as reported by the gateway and the chatbot.
#[derive(Debug, Deserialize)]
struct StatusBody {
    status: Option<String>,
}

/// Checks the gateway, post, search and chat services.
#[derive(Debug, Clone)]
pub struct HealthApi {
    transport: SessionTransport,
    gateway_url: String,
    post_url: String,
    search_url: String,
    chat_url: String,
}

impl HealthApi {
    /// Create a checker over the service base URLs.
    pub fn new(
        transport: SessionTransport,
        gateway_url: impl Into<String>,
        post_url: impl Into<String>,
        search_url: impl Into<String>,
        chat_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            gateway_url: gateway_url.into(),
            post_url: post_url.into(),
            search_url: search_url.into(),
            chat_url: chat_url.into(),
        }
    }

    /// Run every check concurrently. Rows come back in a fixed order.
    pub async fn check_all(&self) -> Vec<ServiceHealth> {
        let (gateway, posts, search, chat) =
            tokio::join!(self.gateway(), self.posts(), self.search(), self.chat());
        vec![gateway, posts, search, chat]
    }

    /// `GET /actuator/health`; the body's `status` is reported as is.
    pub async fn gateway(&self) -> ServiceHealth {
        let request = ApiRequest::get(endpoint(&self.gateway_url, "/actuator/health"));
        self.check("API Gateway", request, |response| {
            let reported = response
                .decode::<StatusBody>()
                .ok()
                .and_then(|b| b.status)
                .unwrap_or_default();
            match reported.to_ascii_uppercase().as_str() {
                "" => (HealthStatus::Up, "UP".to_string()),
                "UP" => (HealthStatus::Up, reported),
                _ => (HealthStatus::Down, reported),
            }
        })
        .await
    }

    /// One-item post listing.
    pub async fn posts(&self) -> ServiceHealth {
        let request = ApiRequest::get(endpoint(&self.post_url, "/api/posts")).query("size", 1);
        self.check("Post service", request, |_| {
            (HealthStatus::Up, "Listing succeeded".to_string())
        })
        .await
    }

    /// A two-hit search.
    pub async fn search(&self) -> ServiceHealth {
        let request = ApiRequest::get(endpoint(&self.search_url, "/api/search"))
            .query("q", "test")
            .query("limit", 2);
        self.check("Search service", request, |_| {
            (HealthStatus::Up, "Search answered".to_string())
        })
        .await
    }

    /// `GET <chat>/health`, which must report `{"status": "ok"}`.
    pub async fn chat(&self) -> ServiceHealth {
        let request = ApiRequest::get(endpoint(&self.chat_url, "/health"));
        self.check("Chat service", request, |response| {
            let reported = response.decode::<StatusBody>().ok().and_then(|b| b.status);
            match reported.as_deref() {
                Some("ok") => (HealthStatus::Up, "Chatbot ready".to_string()),
                Some(other) => (HealthStatus::Down, format!("Reported '{other}'")),
                None => (HealthStatus::Down, "No status in reply".to_string()),
            }
        })
        .await
    }

    async fn check<F>(&self, name: &str, request: ApiRequest, on_success: F) -> ServiceHealth
    where
        F: FnOnce(&ApiResponse) -> (HealthStatus, String),
    {
        let path = request.path().to_string();
        let (status, message) = match self.transport.send_raw(request, RequestPolicy::Public).await
        {
            Ok(response) if response.is_success() => on_success(&response),
            Ok(response) => (HealthStatus::Down, format!("HTTP {}", response.status)),
            Err(e) => {
                debug!(service = name, error = %e, "Health check got no answer");
                (HealthStatus::Unreachable, e.message)
            }
        };

        ServiceHealth {
            name: name.to_string(),
            path,
            status,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{transport, BASE};
    use crate::transport::{MockReply, MockTransport};
    use quill_core::types::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    fn api() -> (Arc<MockTransport>, HealthApi) {
        let (mock, transport) = transport();
        let api = HealthApi::new(transport, BASE, BASE, BASE, format!("{BASE}/chat"));
        (mock, api)
    }

    fn statuses(rows: &[ServiceHealth]) -> Vec<HealthStatus> {
        rows.iter().map(|r| r.status).collect()
    }

    #[tokio::test]
    async fn test_all_services_up() {
        let (mock, api) = api();
        mock.reply(
            HttpMethod::Get,
            "/actuator/health",
            MockReply::json(200, json!({"status": "UP"})),
        );
        mock.reply(HttpMethod::Get, "/api/posts", MockReply::json(200, json!({"content": []})));
        mock.reply(HttpMethod::Get, "/api/search", MockReply::json(200, json!({"results": []})));
        mock.reply(HttpMethod::Get, "/chat/health", MockReply::json(200, json!({"status": "ok"})));

        let rows = api.check_all().await;

        assert_eq!(statuses(&rows), vec![HealthStatus::Up; 4]);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["API Gateway", "Post service", "Search service", "Chat service"]);
        assert_eq!(rows[3].path, "/chat/health");

        let search = mock.last_call(HttpMethod::Get, "/api/search").unwrap();
        assert!(search.query.contains(&("q".to_string(), "test".to_string())));
        assert!(search.query.contains(&("limit".to_string(), "2".to_string())));
        let posts = mock.last_call(HttpMethod::Get, "/api/posts").unwrap();
        assert!(posts.query.contains(&("size".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn test_services_down() {
        let (mock, api) = api();
        mock.reply(
            HttpMethod::Get,
            "/actuator/health",
            MockReply::json(200, json!({"status": "DOWN"})),
        );
        mock.reply(HttpMethod::Get, "/api/posts", MockReply::status(503));
        mock.reply(HttpMethod::Get, "/api/search", MockReply::status(401));
        mock.reply(
            HttpMethod::Get,
            "/chat/health",
            MockReply::json(200, json!({"status": "loading"})),
        );

        let rows = api.check_all().await;

        assert_eq!(statuses(&rows), vec![HealthStatus::Down; 4]);
        assert_eq!(rows[0].message, "DOWN");
        assert_eq!(rows[1].message, "HTTP 503");
        assert_eq!(rows[3].message, "Reported 'loading'");
        // Checks are public: a 401 never triggers a refresh.
        assert_eq!(mock.count(HttpMethod::Post, "/auth/refresh"), 0);
    }

    #[tokio::test]
    async fn test_unreachable_services_are_reported() {
        let (mock, api) = api();
        mock.reply(HttpMethod::Get, "/actuator/health", MockReply::error("connection refused"));
        mock.reply(HttpMethod::Get, "/api/posts", MockReply::timeout());
        mock.reply(HttpMethod::Get, "/api/search", MockReply::error("dns failure"));

        let rows = api.check_all().await;

        assert_eq!(
            statuses(&rows),
            vec![
                HealthStatus::Unreachable,
                HealthStatus::Unreachable,
                HealthStatus::Unreachable,
                // Unrouted: the mock answers 404.
                HealthStatus::Down,
            ]
        );
        assert!(rows[0].message.contains("connection refused"));
    }
}
