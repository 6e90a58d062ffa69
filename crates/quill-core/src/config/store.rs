//! Local persistent store configuration.

use serde::{Deserialize, Serialize};

/// Configuration of the client-local key/value store that mirrors the
/// session identity between runs and between processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend: `"file"` or `"memory"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Path of the JSON document used by the `file` backend.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_path(),
        }
    }
}

fn default_backend() -> String {
    "file".to_string()
}

fn default_path() -> String {
    "data/local-storage.json".to_string()
}
