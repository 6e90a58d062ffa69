//! Semantic search client.

use tracing::warn;

use quill_core::result::AppResult;
use quill_core::types::ApiRequest;

use super::endpoint;
use crate::dto::{SearchHit, SearchResults};
use crate::transport::{RequestPolicy, SessionTransport};

/// Default number of search matches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
/// Default number of related posts.
pub const DEFAULT_RELATED_LIMIT: u32 = 5;

/// Client for `/api/search`.
#[derive(Debug, Clone)]
pub struct SearchApi {
    transport: SessionTransport,
    base_url: String,
}

impl SearchApi {
    /// Create a client for the search service at `base_url`.
    pub fn new(transport: SessionTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Posts semantically close to `query`.
    pub async fn search(&self, query: &str, limit: Option<u32>) -> AppResult<Vec<SearchHit>> {
        let results: Option<SearchResults> = self
            .transport
            .send(
                ApiRequest::get(endpoint(&self.base_url, "/api/search"))
                    .query("q", query)
                    .query("limit", limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
                RequestPolicy::Public,
            )
            .await?
            .decode_optional()?;
        Ok(results.unwrap_or_default().results)
    }

    /// Posts similar to `post_id`; empty on any failure.
    pub async fn related(&self, post_id: &str, limit: Option<u32>) -> Vec<SearchHit> {
        let result = async {
            self.transport
                .send(
                    ApiRequest::get(endpoint(&self.base_url, "/api/search/related"))
                        .query("post_id", post_id)
                        .query("limit", limit.unwrap_or(DEFAULT_RELATED_LIMIT)),
                    RequestPolicy::Public,
                )
                .await?
                .decode_optional::<SearchResults>()
        }
        .await;

        match result {
            Ok(results) => results.unwrap_or_default().results,
            Err(e) => {
                warn!(post_id, error = %e, "Related posts unavailable");
                Vec::new()
            }
        }
    }
}
