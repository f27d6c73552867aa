//! Post service: CRUD, view counting, and the author-only mutation rule.

use tracing::info;

use crate::db::repository::BoardRepository;
use crate::models::{now_timestamp, NewPost, Post, PostId, PostPatch, UserId};

use super::error::{ServiceError, ServiceResult};

/// Fields a caller may change on a post. `None` leaves the field as-is.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub contents: Option<String>,
    pub image_url: Option<String>,
}

/// Create a post for the authenticated author.
pub async fn create(
    repo: &dyn BoardRepository,
    author: Option<UserId>,
    title: String,
    contents: String,
    image_url: Option<String>,
) -> ServiceResult<Post> {
    let author_id = author.ok_or(ServiceError::Unauthenticated)?;

    let post = repo
        .insert_post(NewPost {
            title,
            contents,
            image_url,
            author_id,
            created_at: now_timestamp(),
        })
        .await?;
    info!(
        post_id = post.post_id.value(),
        author_id = author_id.value(),
        "post created"
    );
    Ok(post)
}

/// All posts, comments included.
pub async fn list(repo: &dyn BoardRepository) -> ServiceResult<Vec<Post>> {
    Ok(repo.list_posts().await?)
}

/// One post by ID.
pub async fn get_by_id(repo: &dyn BoardRepository, post_id: PostId) -> ServiceResult<Post> {
    repo.find_post(post_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("post {} not found", post_id)))
}

/// Partially update a post. Only the author may mutate it; omitted fields
/// keep their prior values.
pub async fn update(
    repo: &dyn BoardRepository,
    post_id: PostId,
    requester: Option<UserId>,
    fields: PostUpdate,
) -> ServiceResult<Post> {
    let post = get_by_id(repo, post_id).await?;
    authorize(&post, requester)?;

    let patch = PostPatch {
        title: fields.title,
        contents: fields.contents,
        image_url: fields.image_url,
        views: None,
    };
    if patch.is_empty() {
        // Nothing to change; skip the write entirely.
        return Ok(post);
    }

    let updated = repo.update_post(post_id, patch).await?;
    Ok(updated)
}

/// Delete a post and the comments it owns. Author-only.
pub async fn delete(
    repo: &dyn BoardRepository,
    post_id: PostId,
    requester: Option<UserId>,
) -> ServiceResult<()> {
    let post = get_by_id(repo, post_id).await?;
    authorize(&post, requester)?;

    if !repo.delete_post(post_id).await? {
        return Err(ServiceError::NotFound(format!("post {} not found", post_id)));
    }
    info!(post_id = post_id.value(), "post deleted");
    Ok(())
}

/// Bump a post's view counter and return the new count. Any caller may do
/// this. The read and the write are two storage operations, so concurrent
/// bumps can lose an update; callers get sequential consistency only.
pub async fn increment_views(repo: &dyn BoardRepository, post_id: PostId) -> ServiceResult<i64> {
    let post = get_by_id(repo, post_id).await?;
    let updated = repo
        .update_post(
            post_id,
            PostPatch {
                views: Some(post.views + 1),
                ..Default::default()
            },
        )
        .await?;
    Ok(updated.views)
}

/// Pure query form of the author check used by update/delete.
pub async fn check_edit_permission(
    repo: &dyn BoardRepository,
    post_id: PostId,
    requester: Option<UserId>,
) -> ServiceResult<bool> {
    let post = get_by_id(repo, post_id).await?;
    Ok(requester == Some(post.author_id))
}

/// The uniform mutation rule: acting identity must equal the stored
/// author. No roles, no admin override.
fn authorize(post: &Post, requester: Option<UserId>) -> ServiceResult<()> {
    if requester == Some(post.author_id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "post {} may only be modified by its author",
            post.post_id
        )))
    }
}
