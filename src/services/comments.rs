//! Comment service: CRUD scoped to a parent post.
//!
//! Comment mutation carries no author check, unlike post mutation. The
//! caller identity is still threaded through `create` so the check could
//! be added here without touching the HTTP layer. See DESIGN.md.

use crate::db::repository::BoardRepository;
use crate::models::{now_timestamp, Comment, CommentId, NewComment, PostId, UserId};

use super::error::{ServiceError, ServiceResult};

/// Comments of a post, in stored order.
pub async fn list(repo: &dyn BoardRepository, post_id: PostId) -> ServiceResult<Vec<Comment>> {
    Ok(repo.list_comments(post_id).await?)
}

/// One comment by ID.
pub async fn get_by_id(
    repo: &dyn BoardRepository,
    post_id: PostId,
    comment_id: CommentId,
) -> ServiceResult<Comment> {
    repo.find_comment(post_id, comment_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "comment {} not found on post {}",
                comment_id, post_id
            ))
        })
}

/// Attach a comment to a post.
pub async fn create(
    repo: &dyn BoardRepository,
    post_id: PostId,
    author: Option<UserId>,
    content: String,
) -> ServiceResult<Comment> {
    let author_id = author.ok_or_else(|| {
        ServiceError::Validation("comment author is required".to_string())
    })?;
    if content.trim().is_empty() {
        return Err(ServiceError::Validation(
            "comment content is required".to_string(),
        ));
    }

    let comment = repo
        .insert_comment(
            post_id,
            NewComment {
                content,
                author_id,
                created_at: now_timestamp(),
            },
        )
        .await?;
    Ok(comment)
}

/// Replace a comment's content.
pub async fn update(
    repo: &dyn BoardRepository,
    post_id: PostId,
    comment_id: CommentId,
    content: String,
) -> ServiceResult<Comment> {
    if content.trim().is_empty() {
        return Err(ServiceError::Validation(
            "comment content is required".to_string(),
        ));
    }
    Ok(repo.update_comment(post_id, comment_id, content).await?)
}

/// Remove a comment from its post.
pub async fn delete(
    repo: &dyn BoardRepository,
    post_id: PostId,
    comment_id: CommentId,
) -> ServiceResult<()> {
    if !repo.delete_comment(post_id, comment_id).await? {
        return Err(ServiceError::NotFound(format!(
            "comment {} not found on post {}",
            comment_id, post_id
        )));
    }
    Ok(())
}
