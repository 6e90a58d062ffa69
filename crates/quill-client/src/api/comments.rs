//! Comment endpoints of the post service.

use validator::Validate;

use quill_core::result::AppResult;
use quill_core::types::ApiRequest;

use super::resource;
use crate::dto::{Comment, CommentRequest};
use crate::transport::{RequestPolicy, SessionTransport};

/// Client for post comments.
#[derive(Debug, Clone)]
pub struct CommentApi {
    transport: SessionTransport,
    base_url: String,
}

impl CommentApi {
    /// Create a client for the post service at `base_url`.
    pub fn new(transport: SessionTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Comments on a post, oldest first.
    pub async fn list(&self, post_id: &str) -> AppResult<Vec<Comment>> {
        let response = self
            .transport
            .send(
                ApiRequest::get(resource(&self.base_url, &["api", "posts", post_id, "comments"])?),
                RequestPolicy::Authenticated,
            )
            .await?;
        Ok(response.decode_optional()?.unwrap_or_default())
    }

    /// Add a comment.
    pub async fn create(&self, post_id: &str, content: &str) -> AppResult<Comment> {
        let body = Self::body(content)?;
        self.transport
            .send(
                ApiRequest::post(resource(&self.base_url, &["api", "posts", post_id, "comments"])?)
                .json(&body)?,
                RequestPolicy::Authenticated,
            )
            .await?
            .decode()
    }

    /// Edit a comment.
    pub async fn update(&self, comment_id: &str, content: &str) -> AppResult<Comment> {
        let body = Self::body(content)?;
        self.transport
            .send(
                ApiRequest::put(resource(&self.base_url, &["api", "posts", "comments", comment_id])?)
                .json(&body)?,
                RequestPolicy::Authenticated,
            )
            .await?
            .decode()
    }

    /// Delete a comment.
    pub async fn delete(&self, comment_id: &str) -> AppResult<()> {
        self.transport
            .send(
                ApiRequest::delete(resource(&self.base_url, &["api", "posts", "comments", comment_id])?),
                RequestPolicy::Authenticated,
            )
            .await?;
        Ok(())
    }

    fn body(content: &str) -> AppResult<CommentRequest> {
        let body = CommentRequest {
            content: content.trim().to_string(),
        };
        body.validate()?;
        Ok(body)
    }
}
