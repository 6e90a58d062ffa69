//! Thin clients for the backend services.
//!
//! Every client shares one [`SessionTransport`](crate::transport::SessionTransport),
//! so the session cookie and the refresh policy apply uniformly.

pub mod auth;
pub mod chat;
pub mod comments;
pub mod health;
pub mod posts;
pub mod search;
pub mod taxonomy;
pub mod user;

pub use auth::AuthApi;
pub use chat::ChatApi;
pub use comments::CommentApi;
pub use health::{HealthApi, HealthStatus, ServiceHealth};
pub use posts::{PostApi, PostFilter, PostQuery};
pub use search::SearchApi;
pub use taxonomy::TaxonomyApi;
pub use user::UserApi;

use reqwest::Url;

use quill_core::error::AppError;
use quill_core::result::AppResult;

/// Join a service base URL and an absolute path.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Append path segments to a service base URL. Each segment is
/// percent-encoded, so an id can never add path levels or a query.
pub(crate) fn resource(base: &str, segments: &[&str]) -> AppResult<String> {
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(AppError::invalid_field("id", "Identifier is required"));
    }
    let mut url = Url::parse(base)
        .map_err(|e| AppError::configuration(format!("Invalid service URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AppError::configuration(format!("Service URL '{base}' cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
