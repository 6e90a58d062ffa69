//! # quill-core
//!
//! Core crate for the Quill blog client. Contains configuration schemas,
//! identity and pagination types, session/transport events, the seam
//! traits (local key/value store, HTTP transport), and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Quill crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
