//! Backend service endpoints and HTTP client settings.

use serde::{Deserialize, Serialize};

/// Base URLs of the backend microservices and request timeouts.
///
/// Every service defaults to the production gateway; deployments that
/// split services across hosts override the individual URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Auth service base URL (`/auth/*`).
    #[serde(default = "default_base_url")]
    pub auth_url: String,
    /// User service base URL (`/user/*`).
    #[serde(default = "default_base_url")]
    pub user_url: String,
    /// Post service base URL (`/api/posts/*`), also serving comments and taxonomy.
    #[serde(default = "default_base_url")]
    pub post_url: String,
    /// Search service base URL (`/api/search/*`).
    #[serde(default = "default_base_url")]
    pub search_url: String,
    /// Full URL of the chatbot endpoint.
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    /// Timeout for regular requests in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Timeout for chatbot requests in seconds.
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_seconds: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            auth_url: default_base_url(),
            user_url: default_base_url(),
            post_url: default_base_url(),
            search_url: default_base_url(),
            chat_url: default_chat_url(),
            request_timeout_seconds: default_request_timeout(),
            chat_timeout_seconds: default_chat_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://minkowskim.com".to_string()
}

fn default_chat_url() -> String {
    "https://minkowskim.com/chat".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_chat_timeout() -> u64 {
    60
}
