//! Response DTOs.

use serde::{Deserialize, Serialize};

use quill_core::types::id::{deserialize_id, deserialize_opt_id};
use quill_core::types::Identity;

/// Body of a successful login or signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserResponse {
    /// User ID.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Display nickname, when the service sends one.
    #[serde(default)]
    pub nickname: Option<String>,
}

impl AuthUserResponse {
    /// The identity to keep for this user. The nickname falls back to
    /// the username, then to an empty string.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), display_name(&self.nickname, &self.username))
    }
}

/// `GET /user/me` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID; absent or empty means no valid session.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    /// Display nickname.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    /// The identity this profile proves, if it carries a usable id.
    pub fn identity(&self) -> Option<Identity> {
        let id = self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        Some(Identity::new(id, display_name(&self.nickname, &self.username)))
    }
}

fn display_name(nickname: &Option<String>, username: &Option<String>) -> String {
    nickname
        .as_deref()
        .or(username.as_deref())
        .unwrap_or_default()
        .to_string()
}

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post ID.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Markdown body. Listings may omit it.
    #[serde(default)]
    pub content: Option<String>,
    /// Category name.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Tag names.
    #[serde(default)]
    pub tag_names: Vec<String>,
    /// Author user ID.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub author_id: Option<String>,
    /// Author nickname.
    #[serde(default)]
    pub author_nickname: Option<String>,
    /// Creation time as sent by the service (local time, no zone).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment ID.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Text.
    #[serde(default)]
    pub content: String,
    /// Author user ID.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub author_id: Option<String>,
    /// Author nickname.
    #[serde(default)]
    pub author_nickname: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A post category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    /// Name.
    pub name: String,
}

/// A post tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag ID.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    /// Name.
    pub name: String,
}

/// One semantic search match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Matching post.
    #[serde(deserialize_with = "deserialize_id")]
    pub post_id: String,
    /// Post title.
    #[serde(default)]
    pub title: Option<String>,
    /// Excerpt around the match.
    #[serde(default)]
    pub snippet: Option<String>,
    /// Similarity in `0.0..=1.0`.
    #[serde(default)]
    pub score: Option<f64>,
}

/// `{ results: [...] }` wrapper used by the search service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches, best first.
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Chat service answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply.
    #[serde(default)]
    pub response: Option<String>,
}
