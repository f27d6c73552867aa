//! Domain entities for the community board.
//!
//! These types are shared by the repository backends, the service layer,
//! and the HTTP DTOs. Identifiers are numeric newtypes; timestamps are
//! stored pre-formatted (`YYYY-MM-DD HH:MM:SS`) to match the on-disk
//! layout of existing deployments.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// User identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Post identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(pub i64);

/// Comment identifier, unique only within its parent post.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommentId(pub i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        UserId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl PostId {
    pub fn new(value: i64) -> Self {
        PostId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl CommentId {
    pub fn new(value: i64) -> Self {
        CommentId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account.
///
/// The password is stored in plaintext. This mirrors the data the system
/// inherits; replacing it with a hash is out of scope for now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub nickname: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// Fields for a new account; the repository assigns `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub nickname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Field-masked update for a user record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub profile_image_url: Option<String>,
}

/// A board post, owning its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub title: String,
    pub contents: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author_id: UserId,
    pub created_at: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Fields for a new post; the repository assigns `post_id` and starts the
/// record with zero views and no comments.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub contents: String,
    pub image_url: Option<String>,
    pub author_id: UserId,
    pub created_at: String,
}

/// Field-masked update for a post record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub contents: Option<String>,
    pub image_url: Option<String>,
    pub views: Option<i64>,
}

impl PostPatch {
    /// True when no field is set; an empty patch is a no-op update.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.contents.is_none()
            && self.image_url.is_none()
            && self.views.is_none()
    }
}

/// A comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub created_at: String,
}

/// Fields for a new comment; the repository assigns `comment_id` scoped to
/// the parent post.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author_id: UserId,
    pub created_at: String,
}

/// Current time formatted as `YYYY-MM-DD HH:MM:SS`, the format every
/// stored `created_at` uses.
pub fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_newtypes_round_trip() {
        assert_eq!(UserId::new(7).value(), 7);
        assert_eq!(PostId::new(3).to_string(), "3");
        assert_eq!(CommentId::new(12).value(), 12);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(PostPatch::default().is_empty());
        let patch = PostPatch {
            title: Some("t".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn timestamp_format_matches_stored_layout() {
        let ts = now_timestamp();
        // YYYY-MM-DD HH:MM:SS is 19 chars with fixed separators
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[13..14], ":");
    }

    #[test]
    fn user_serializes_without_missing_profile_image() {
        let user = User {
            user_id: UserId::new(1),
            nickname: "silvia".to_string(),
            email: "s@example.com".to_string(),
            password: "pw".to_string(),
            profile_image_url: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("profile_image_url").is_none());
    }
}
