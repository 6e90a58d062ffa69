//! JSON-file store implementation.
//!
//! The whole store is one flat JSON object. Every read goes to disk so
//! a handle observes writes made by other processes; every write
//! replaces the file atomically (temp file + rename).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::traits::store::KeyValueStore;

type Document = BTreeMap<String, String>;

/// Key/value store persisted as a JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::with_source(
                        quill_core::error::ErrorKind::Storage,
                        format!("Failed to create store directory {}: {e}", parent.display()),
                        e,
                    )
                })?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> AppResult<Document> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                // A damaged store only ever holds hints; start over.
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable local store");
                Ok(Document::new())
            }
        }
    }

    /// Each write gets its own temp file next to the target, so
    /// concurrent writers never rename each other's file away.
    fn write_document(&self, doc: &Document) -> AppResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), doc)?;
        tmp.as_file_mut().flush()?;
        tmp.persist(&self.path).map_err(|e| {
            AppError::with_source(
                quill_core::error::ErrorKind::Storage,
                format!("Failed to replace {}: {}", self.path.display(), e.error),
                e.error,
            )
        })?;
        debug!(path = %self.path.display(), keys = doc.len(), "Local store written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Document)) -> AppResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut doc = self.read_document()?;
        apply(&mut doc);
        self.write_document(&doc)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.update(|doc| {
            doc.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.update(|doc| {
            doc.remove(key);
        })
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        self.update(|doc| {
            for (key, value) in entries {
                doc.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        self.update(|doc| {
            for key in keys {
                doc.remove(*key);
            }
        })
    }
}
