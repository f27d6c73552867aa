//! Data Transfer Objects for the HTTP API.
//!
//! Aliases on the request types accept the field names the legacy
//! frontend sends (`postTitle`, `comment_content`, ...) alongside the
//! canonical snake_case names.

use serde::{Deserialize, Serialize};

/// Request body for registering an account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
    #[serde(default, alias = "profileimg")]
    pub profile_image_url: Option<String>,
}

/// Request body for logging in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for a nickname change.
#[derive(Debug, Clone, Deserialize)]
pub struct NicknameRequest {
    pub nickname: String,
}

/// Request body for a password change.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// Request body for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    #[serde(alias = "postTitle")]
    pub title: String,
    #[serde(alias = "postContents")]
    pub contents: String,
    #[serde(default, alias = "postImage")]
    pub image_url: Option<String>,
}

/// Request body for a partial post update. Omitted fields keep their
/// prior values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default, alias = "postTitle")]
    pub title: Option<String>,
    #[serde(default, alias = "postContents")]
    pub contents: Option<String>,
    #[serde(default, alias = "postImage")]
    pub image_url: Option<String>,
}

/// Request body for creating a comment. The author travels in the body,
/// as the legacy frontend sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(alias = "comment_content")]
    pub content: String,
    #[serde(default, alias = "user_id")]
    pub author_id: Option<i64>,
}

/// Request body for editing a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(alias = "comment_content")]
    pub content: String,
}

/// Account list response, shaped like the accounts document.
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<crate::models::User>,
}

/// Single-account response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: crate::models::User,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// View-counter response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: i64,
}

/// Stored-image URL response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlResponse {
    pub image_url: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Storage backend status
    pub storage: String,
}
