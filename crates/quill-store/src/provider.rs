//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use tracing::info;

use quill_core::config::StoreConfig;
use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::traits::store::KeyValueStore;

/// Store manager that wraps the configured key/value backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store.
    inner: Arc<dyn KeyValueStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStore> = match config.backend.as_str() {
            "file" => {
                info!(path = %config.path, "Initializing file-backed local store");
                Arc::new(crate::file::FileStore::open(&config.path)?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory local store");
                Arc::new(crate::memory::MemoryStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store backend: '{other}'. Supported: file, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner: store }
    }
}

impl KeyValueStore for StoreManager {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        self.inner.set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        self.inner.remove_many(keys)
    }
}
