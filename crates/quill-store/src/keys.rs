//! Local store keys.
//!
//! Centralising key names prevents typos and keeps the on-disk layout
//! compatible with the web frontend's `localStorage` entries.

/// Key holding the signed-in user's identifier.
pub const CURRENT_USER_ID: &str = "currentUserId";

/// Key holding the signed-in user's nickname.
pub const CURRENT_USER_NICKNAME: &str = "currentUserNickname";

/// Every key that makes up the persisted session identity.
pub const SESSION_KEYS: [&str; 2] = [CURRENT_USER_ID, CURRENT_USER_NICKNAME];
