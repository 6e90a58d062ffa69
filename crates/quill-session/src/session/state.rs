//! Observable session snapshot.

use serde::Serialize;

use quill_core::types::SessionState;

/// Where the manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// `initialize` has not run yet.
    Uninitialized,
    /// Waiting for the identity check. The state may hold an
    /// unconfirmed identity read from the local cache.
    Hydrating,
    /// A confirmed session; the extension timer runs.
    Authenticated,
    /// No session.
    Anonymous,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Hydrating => write!(f, "hydrating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// Value published to observers on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Identity as the rest of the application should see it.
    pub state: SessionState,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Set once initialization has finished, success or not.
    pub initialized: bool,
    /// An extension request is in flight.
    pub extending: bool,
}

impl SessionSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::anonymous(),
            phase: SessionPhase::Uninitialized,
            initialized: false,
            extending: false,
        }
    }

    /// Shorthand for `state.is_authenticated()`.
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }
}
