//! Post service client.

use validator::Validate;

use quill_core::result::AppResult;
use quill_core::types::{ApiRequest, Page, PageRequest};

use super::{endpoint, resource};
use crate::dto::{Post, PostRequest};
use crate::transport::{RequestPolicy, SessionTransport};

/// Optional listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post.
    #[default]
    All,
    /// Posts in a category.
    Category(String),
    /// Posts carrying a tag.
    Tag(String),
}

impl PostFilter {
    /// Build a filter from optional category and tag names. The category
    /// wins when both are given.
    pub fn from_parts(category: Option<String>, tag: Option<String>) -> Self {
        match (category, tag) {
            (Some(c), _) if !c.is_empty() => Self::Category(c),
            (_, Some(t)) if !t.is_empty() => Self::Tag(t),
            _ => Self::All,
        }
    }
}

/// Listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Page and size.
    pub page: PageRequest,
    /// Filter.
    pub filter: PostFilter,
}

/// Client for `/api/posts`.
#[derive(Debug, Clone)]
pub struct PostApi {
    transport: SessionTransport,
    base_url: String,
}

impl PostApi {
    /// Create a client for the post service at `base_url`.
    pub fn new(transport: SessionTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// One page of posts, newest first.
    pub async fn list(&self, query: &PostQuery) -> AppResult<Page<Post>> {
        let (path, name) = match &query.filter {
            PostFilter::All => ("/api/posts", None),
            PostFilter::Category(name) => ("/api/posts/category", Some(name)),
            PostFilter::Tag(name) => ("/api/posts/tag", Some(name)),
        };
        let mut request =
            ApiRequest::get(endpoint(&self.base_url, path)).query_pairs(query.page.query());
        if let Some(name) = name {
            request = request.query("name", name);
        }

        self.transport
            .send(request, RequestPolicy::Authenticated)
            .await?
            .decode()
    }

    /// A single post.
    pub async fn get(&self, id: &str) -> AppResult<Post> {
        self.transport
            .send(
                ApiRequest::get(resource(&self.base_url, &["api", "posts", id])?),
                RequestPolicy::Authenticated,
            )
            .await?
            .decode()
    }

    /// Publish a post as the signed-in user.
    pub async fn create(&self, post: &PostRequest) -> AppResult<Post> {
        post.validate()?;
        self.transport
            .send(
                ApiRequest::post(endpoint(&self.base_url, "/api/posts")).json(post)?,
                RequestPolicy::Authenticated,
            )
            .await?
            .decode()
    }

    /// Replace a post's content.
    pub async fn update(&self, id: &str, post: &PostRequest) -> AppResult<Post> {
        post.validate()?;
        self.transport
            .send(
                ApiRequest::put(resource(&self.base_url, &["api", "posts", id])?).json(post)?,
                RequestPolicy::Authenticated,
            )
            .await?
            .decode()
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.transport
            .send(
                ApiRequest::delete(resource(&self.base_url, &["api", "posts", id])?),
                RequestPolicy::Authenticated,
            )
            .await?;
        Ok(())
    }
}
