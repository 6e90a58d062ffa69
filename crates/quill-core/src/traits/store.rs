//! Key/value store trait for the client-local persistent store.

use crate::result::AppResult;

/// Trait for client-local persistent stores (a JSON file on disk, or
/// memory in tests).
///
/// Values are plain strings. Reads must observe writes made by other
/// handles to the same backing store, which is how separate processes
/// see each other's login and logout.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;

    /// Set several values in one write.
    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove several keys in one write.
    fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Get a typed value by deserializing from JSON.
    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }
}
