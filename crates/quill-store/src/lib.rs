//! # quill-store
//!
//! Client-local persistent stores for Quill. Supports two backends:
//!
//! - **file**: a JSON document on disk, shared by every process that
//!   points at the same path
//! - **memory**: in-process map using [dashmap](https://crates.io/crates/dashmap)
//!
//! The backend is selected at runtime based on configuration.

pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use file::FileStore;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use provider::StoreManager;
