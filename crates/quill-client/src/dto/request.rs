//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    /// Build a login request.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Account registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Login name.
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 8, max = 20, message = "Password must be 8 to 20 characters"))]
    pub password: String,
    /// Display nickname.
    #[validate(custom(function = "not_blank", message = "Nickname is required"))]
    pub nickname: String,
    /// Verified email address.
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
}

/// Email verification code request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    /// Address to send the code to.
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
}

/// Email verification code check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    /// Address the code was sent to.
    pub email: String,
    /// The code the user typed.
    pub code: String,
}

/// Create/update post body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    /// Markdown body.
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
    /// Category name; created on the server when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// Tag names.
    #[serde(default)]
    pub tag_names: Vec<String>,
}

impl PostRequest {
    /// Split a comma separated tag list, dropping empty entries.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Create/update comment body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentRequest {
    /// Comment text.
    #[validate(custom(function = "not_blank", message = "Comment content is required"))]
    pub content: String,
}

/// Chat message body. Field names are snake_case on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation key; the user id when signed in.
    pub session_id: String,
    /// User message.
    pub message: String,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::error::{AppError, ErrorKind};

    fn signup() -> SignupRequest {
        SignupRequest {
            username: "minkowski".into(),
            password: "password123".into(),
            nickname: "mk".into(),
            email: "mk@example.com".into(),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(signup().validate().is_ok());
    }

    #[test]
    fn test_signup_field_errors() {
        let mut req = signup();
        req.password = "short".into();
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.field.as_deref(), Some("password"));

        let mut req = signup();
        req.password = "x".repeat(21);
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(err.field.as_deref(), Some("password"));

        let mut req = signup();
        req.nickname = "   ".into();
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(err.field.as_deref(), Some("nickname"));
        assert_eq!(err.message, "Nickname is required");

        let mut req = signup();
        req.username = "ab".into();
        req.email = "nope".into();
        let err: AppError = req.validate().unwrap_err().into();
        // Fields are reported in name order.
        assert_eq!(err.field.as_deref(), Some("email"));
    }

    #[test]
    fn test_post_request_wire_shape() {
        let req = PostRequest {
            title: "Hello".into(),
            content: "body".into(),
            category_name: Some("rust".into()),
            tag_names: PostRequest::parse_tags(" async, ,tokio "),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "title": "Hello",
                "content": "body",
                "categoryName": "rust",
                "tagNames": ["async", "tokio"]
            })
        );
    }
}
