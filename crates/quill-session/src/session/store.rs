//! Persisted identity hint.
//!
//! Mirrors the signed-in identity into the local store under
//! `currentUserId` / `currentUserNickname`. The server is the source of
//! truth; this only lets a fresh process show the last known user before
//! the identity check answers.

use std::sync::Arc;

use tracing::{debug, warn};

use quill_core::result::AppResult;
use quill_core::traits::store::KeyValueStore;
use quill_core::types::Identity;
use quill_store::keys::{CURRENT_USER_ID, CURRENT_USER_NICKNAME, SESSION_KEYS};

/// Session identity cache over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    /// Wrap `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The cached identity, present only when both keys hold non-empty
    /// values. Read failures count as absent.
    pub fn load(&self) -> Option<Identity> {
        let read = |key: &str| match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session cache");
                None
            }
        };

        let user_id = read(CURRENT_USER_ID)?;
        let nickname = read(CURRENT_USER_NICKNAME)?;
        Some(Identity::new(user_id, nickname))
    }

    /// Persist `identity`, replacing any previous one.
    pub fn save(&self, identity: &Identity) -> AppResult<()> {
        self.store.set_many(&[
            (CURRENT_USER_ID, identity.user_id.as_str()),
            (CURRENT_USER_NICKNAME, identity.nickname.as_str()),
        ])?;
        debug!(user_id = %identity.user_id, "Session cache written");
        Ok(())
    }

    /// Remove both keys.
    pub fn clear(&self) -> AppResult<()> {
        self.store.remove_many(&SESSION_KEYS)?;
        debug!("Session cache cleared");
        Ok(())
    }
}
