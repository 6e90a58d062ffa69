//! Core type definitions used across the Quill workspace.

pub mod http;
pub mod id;
pub mod identity;
pub mod pagination;

pub use http::{ApiRequest, ApiResponse, HttpMethod};
pub use id::{deserialize_id, deserialize_opt_id};
pub use identity::{Identity, SessionState};
pub use pagination::{Page, PageRequest};
