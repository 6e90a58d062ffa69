//! Core traits defined in `quill-core` and implemented by other crates.

pub mod store;
pub mod transport;

pub use store::KeyValueStore;
pub use transport::HttpTransport;
