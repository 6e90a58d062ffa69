//! Client-side identity and session state.

use serde::{Deserialize, Serialize};

/// The identity of a signed-in user as the client knows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Remote user identifier.
    pub user_id: String,
    /// Display nickname.
    pub nickname: String,
}

impl Identity {
    /// Create a new identity.
    pub fn new(user_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: nickname.into(),
        }
    }
}

/// Current session state exposed to the rest of the application.
///
/// `is_authenticated` is true exactly when both `user_id` and `nickname`
/// are present. The fields are private so the only way to build a value
/// is through [`SessionState::anonymous`] or [`SessionState::authenticated`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    is_authenticated: bool,
    user_id: Option<String>,
    nickname: Option<String>,
}

impl SessionState {
    /// The signed-out state.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The signed-in state for `identity`.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(identity.user_id),
            nickname: Some(identity.nickname),
        }
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// The signed-in user's identifier.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The signed-in user's nickname.
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// The identity, when signed in.
    pub fn identity(&self) -> Option<Identity> {
        match (&self.user_id, &self.nickname) {
            (Some(id), Some(nick)) => Some(Identity::new(id.clone(), nick.clone())),
            _ => None,
        }
    }
}

impl From<Option<Identity>> for SessionState {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or_else(Self::anonymous, Self::authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant() {
        let anon = SessionState::anonymous();
        assert!(!anon.is_authenticated());
        assert_eq!(anon.user_id(), None);
        assert_eq!(anon.nickname(), None);
        assert_eq!(anon.identity(), None);

        let auth = SessionState::authenticated(Identity::new("7", "bob"));
        assert!(auth.is_authenticated());
        assert_eq!(auth.user_id(), Some("7"));
        assert_eq!(auth.nickname(), Some("bob"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SessionState::authenticated(Identity::new("7", "bob")))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"isAuthenticated": true, "userId": "7", "nickname": "bob"})
        );
    }
}
