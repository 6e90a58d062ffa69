//! Category and tag listings.
//!
//! These feed navigation only, so failures degrade to empty lists.

use tracing::warn;

use quill_core::types::ApiRequest;

use super::endpoint;
use crate::dto::{Category, Tag};
use crate::transport::{RequestPolicy, SessionTransport};

/// Client for `/api/posts/categories` and `/api/posts/tags`.
#[derive(Debug, Clone)]
pub struct TaxonomyApi {
    transport: SessionTransport,
    base_url: String,
}

impl TaxonomyApi {
    /// Create a client for the post service at `base_url`.
    pub fn new(transport: SessionTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// All categories; empty on any failure.
    pub async fn categories(&self) -> Vec<Category> {
        self.fetch("/api/posts/categories").await
    }

    /// All tags; empty on any failure.
    pub async fn tags(&self) -> Vec<Tag> {
        self.fetch("/api/posts/tags").await
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Vec<T> {
        let result = async {
            self.transport
                .send(
                    ApiRequest::get(endpoint(&self.base_url, path)),
                    RequestPolicy::Public,
                )
                .await?
                .decode_optional::<Vec<T>>()
        }
        .await;

        match result {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                warn!(path, error = %e, "Listing unavailable, using empty list");
                Vec::new()
            }
        }
    }
}
