//! Auth service client.

use tracing::{debug, info};
use validator::Validate;

use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::types::{ApiRequest, Identity};

use super::endpoint;
use crate::dto::{AuthUserResponse, LoginRequest, SendCodeRequest, SignupRequest, VerifyCodeRequest};
use crate::transport::{RequestPolicy, SessionTransport};

/// Client for `/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthApi {
    transport: SessionTransport,
    base_url: String,
}

impl AuthApi {
    /// Create a client for the auth service at `base_url`.
    pub fn new(transport: SessionTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Exchange credentials for a session cookie.
    ///
    /// A rejected password is reported as `Authentication`; it never
    /// triggers the credential refresh.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<Identity> {
        request.validate()?;
        let response = self
            .transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/auth/login")).json(request)?,
                RequestPolicy::Public,
            )
            .await?;

        let user: AuthUserResponse = response.decode()?;
        if user.id.trim().is_empty() {
            return Err(AppError::unauthorized("Login response carried no user id"));
        }
        info!(user_id = %user.id, "Login accepted");
        Ok(user.identity())
    }

    /// Revoke the server-side session.
    pub async fn logout(&self) -> AppResult<()> {
        self.transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/auth/logout")),
                RequestPolicy::Public,
            )
            .await?;
        Ok(())
    }

    /// Rotate the access credential using the refresh credential.
    pub async fn refresh(&self) -> AppResult<()> {
        self.transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/auth/refresh")),
                RequestPolicy::Public,
            )
            .await?;
        Ok(())
    }

    /// Push the session expiry forward.
    pub async fn extend(&self) -> AppResult<()> {
        self.transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/auth/extend")),
                RequestPolicy::SessionBound,
            )
            .await?;
        debug!("Session extension accepted");
        Ok(())
    }

    /// Email a verification code to `email`.
    pub async fn send_code(&self, email: &str) -> AppResult<()> {
        let body = SendCodeRequest {
            email: email.to_string(),
        };
        body.validate()?;
        self.transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/auth/send-code")).json(&body)?,
                RequestPolicy::Public,
            )
            .await?;
        Ok(())
    }

    /// Check a verification code. `false` means the service rejected it.
    pub async fn verify_code(&self, email: &str, code: &str) -> AppResult<bool> {
        let body = VerifyCodeRequest {
            email: email.to_string(),
            code: code.to_string(),
        };
        let response = self
            .transport
            .send_raw(
                ApiRequest::post(endpoint(&self.base_url, "/auth/verify-code")).json(&body)?,
                RequestPolicy::Public,
            )
            .await?;

        match response.status {
            200 => Ok(true),
            400 => Ok(false),
            _ => response.error_for_status().map(|_| false),
        }
    }

    /// Register an account. Input is validated before any request is made.
    pub async fn signup(&self, request: &SignupRequest) -> AppResult<Identity> {
        request.validate()?;
        let response = self
            .transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/auth/signup")).json(request)?,
                RequestPolicy::Public,
            )
            .await?;

        let mut identity = response.decode::<AuthUserResponse>()?.identity();
        if identity.nickname.is_empty() {
            identity.nickname = request.nickname.clone();
        }
        info!(user_id = %identity.user_id, "Account registered");
        Ok(identity)
    }
}
