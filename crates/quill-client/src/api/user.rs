//! User service client.

use tracing::debug;

use quill_core::result::AppResult;
use quill_core::types::ApiRequest;

use super::endpoint;
use crate::dto::UserProfile;
use crate::transport::{RequestPolicy, SessionTransport};

/// Client for `/user/*`.
#[derive(Debug, Clone)]
pub struct UserApi {
    transport: SessionTransport,
    base_url: String,
}

impl UserApi {
    /// Create a client for the user service at `base_url`.
    pub fn new(transport: SessionTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// The identity check. `None` means the server holds no valid
    /// session for this client (401, or an empty body).
    pub async fn me(&self) -> AppResult<Option<UserProfile>> {
        let response = self
            .transport
            .send_raw(
                ApiRequest::get(endpoint(&self.base_url, "/user/me")),
                RequestPolicy::SessionBound,
            )
            .await?;

        if response.status == 401 {
            debug!("Identity check: no session");
            return Ok(None);
        }
        response.error_for_status()?.decode_optional()
    }

    /// Whether `username` is already taken.
    pub async fn check_username(&self, username: &str) -> AppResult<bool> {
        self.check("/user/check-username", "username", username).await
    }

    /// Whether `nickname` is already taken.
    pub async fn check_nickname(&self, nickname: &str) -> AppResult<bool> {
        self.check("/user/check-nickname", "nickname", nickname).await
    }

    async fn check(&self, path: &str, param: &str, value: &str) -> AppResult<bool> {
        self.transport
            .send(
                ApiRequest::get(endpoint(&self.base_url, path)).query(param, value),
                RequestPolicy::Public,
            )
            .await?
            .decode()
    }
}
