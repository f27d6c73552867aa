//! Repository trait definitions.
//!
//! The storage contract every backend satisfies: four CRUD verbs per
//! collection plus the cascade helpers the services need. Each verb is a
//! single unit of work from the caller's perspective; a backend must not
//! expose partially-applied state for one call to another caller.
//!
//! ID allocation is part of the contract: a new numeric ID is the maximum
//! existing ID in the collection plus one (1 for an empty collection),
//! computed inside the insert's unit of work. Deleting the highest-ID
//! record frees its ID for the next insert; backends must not substitute
//! a monotonic counter.

use async_trait::async_trait;

use crate::models::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, PostPatch, User, UserId,
    UserPatch,
};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// CRUD operations over the user collection.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// All users, in stored order.
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;

    /// Look up one user. `None` when absent.
    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>>;

    /// Insert a user, assigning the next ID per the max+1 policy.
    async fn insert_user(&self, record: NewUser) -> RepositoryResult<User>;

    /// Apply a field-masked update. Fails with `NotFound` when absent.
    async fn update_user(&self, user_id: UserId, patch: UserPatch) -> RepositoryResult<User>;

    /// Remove a user record. Returns whether a record was removed.
    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<bool>;
}

/// CRUD operations over the post collection and the comments each post owns.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, in stored order.
    async fn list_posts(&self) -> RepositoryResult<Vec<Post>>;

    /// Look up one post, comments included. `None` when absent.
    async fn find_post(&self, post_id: PostId) -> RepositoryResult<Option<Post>>;

    /// Insert a post with zero views and no comments, assigning the next
    /// ID per the max+1 policy.
    async fn insert_post(&self, record: NewPost) -> RepositoryResult<Post>;

    /// Apply a field-masked update. Fails with `NotFound` when absent.
    async fn update_post(&self, post_id: PostId, patch: PostPatch) -> RepositoryResult<Post>;

    /// Remove a post and every comment it owns as one unit of work.
    /// Returns whether a record was removed.
    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<bool>;

    /// Remove every post authored by `author_id` (comments included).
    /// Returns the number of posts removed.
    async fn delete_posts_by_author(&self, author_id: UserId) -> RepositoryResult<u64>;

    /// Comments of a post, in stored order. Fails with `NotFound` when the
    /// post is absent.
    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>>;

    /// Look up one comment. `None` when the comment is absent; fails with
    /// `NotFound` when the post itself is absent.
    async fn find_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<Option<Comment>>;

    /// Insert a comment, assigning the next ID per the max+1 policy scoped
    /// to the parent post. Fails with `NotFound` when the post is absent.
    async fn insert_comment(
        &self,
        post_id: PostId,
        record: NewComment,
    ) -> RepositoryResult<Comment>;

    /// Replace a comment's content. Fails with `NotFound` when post or
    /// comment is absent.
    async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: String,
    ) -> RepositoryResult<Comment>;

    /// Remove one comment. Returns whether a record was removed; fails
    /// with `NotFound` when the post is absent.
    async fn delete_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<bool>;
}

/// The full storage contract the services depend on.
#[async_trait]
pub trait BoardRepository: AccountRepository + PostRepository + Send + Sync {
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
