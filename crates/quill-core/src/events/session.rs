//! Session lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The user asked to log out.
    Logout,
    /// The server refused to extend the session.
    ExtensionFailed,
    /// The transport reported an unrecoverable unauthorized response.
    Invalidated,
    /// The identity check found no valid session.
    IdentityRejected,
    /// The identity check could not reach the server.
    IdentityUnavailable,
    /// Another process cleared the shared local store.
    ExternalChange,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logout => write!(f, "logout"),
            Self::ExtensionFailed => write!(f, "extension_failed"),
            Self::Invalidated => write!(f, "invalidated"),
            Self::IdentityRejected => write!(f, "identity_rejected"),
            Self::IdentityUnavailable => write!(f, "identity_unavailable"),
            Self::ExternalChange => write!(f, "external_change"),
        }
    }
}

/// Events emitted by the session lifecycle manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The session was confirmed or established.
    Started {
        /// The user ID.
        user_id: String,
        /// The nickname.
        nickname: String,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// The server extended the session lifetime.
    Extended {
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// The session ended and local state was reset.
    Ended {
        /// Why the session ended.
        reason: EndReason,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// Initialization finished (emitted exactly once).
    Initialized {
        /// Whether a user is signed in after initialization.
        authenticated: bool,
        /// When it happened.
        at: DateTime<Utc>,
    },
}
