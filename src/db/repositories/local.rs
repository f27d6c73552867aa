//! In-memory repository for unit testing and local development.
//!
//! Holds the same logical collections as the file-backed layout: a user
//! list and a post map keyed by ID, each post embedding its comments.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::db::repository::{
    AccountRepository, BoardRepository, ErrorContext, PostRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, PostPatch, User, UserId,
    UserPatch,
};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    posts: BTreeMap<i64, Post>,
}

/// In-memory implementation of the repository contract.
#[derive(Debug, Default)]
pub struct LocalRepository {
    state: RwLock<Collections>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_user_id(users: &[User]) -> i64 {
    users.iter().map(|u| u.user_id.value()).max().unwrap_or(0) + 1
}

fn next_post_id(posts: &BTreeMap<i64, Post>) -> i64 {
    posts.keys().max().copied().unwrap_or(0) + 1
}

fn next_comment_id(comments: &[Comment]) -> i64 {
    comments
        .iter()
        .map(|c| c.comment_id.value())
        .max()
        .unwrap_or(0)
        + 1
}

fn post_not_found(operation: &str, post_id: PostId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("post {} not found", post_id),
        ErrorContext::new(operation)
            .with_entity("post")
            .with_entity_id(post_id),
    )
}

#[async_trait]
impl AccountRepository for LocalRepository {
    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.state.read().users.clone())
    }

    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn insert_user(&self, record: NewUser) -> RepositoryResult<User> {
        let mut state = self.state.write();
        let user = User {
            user_id: UserId::new(next_user_id(&state.users)),
            nickname: record.nickname,
            email: record.email,
            password: record.password,
            profile_image_url: record.profile_image_url,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, patch: UserPatch) -> RepositoryResult<User> {
        let mut state = self.state.write();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("user {} not found", user_id),
                    ErrorContext::new("update_user")
                        .with_entity("user")
                        .with_entity_id(user_id),
                )
            })?;
        if let Some(nickname) = patch.nickname {
            user.nickname = nickname;
        }
        if let Some(password) = patch.password {
            user.password = password;
        }
        if let Some(url) = patch.profile_image_url {
            user.profile_image_url = Some(url);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<bool> {
        let mut state = self.state.write();
        let before = state.users.len();
        state.users.retain(|u| u.user_id != user_id);
        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl PostRepository for LocalRepository {
    async fn list_posts(&self) -> RepositoryResult<Vec<Post>> {
        Ok(self.state.read().posts.values().cloned().collect())
    }

    async fn find_post(&self, post_id: PostId) -> RepositoryResult<Option<Post>> {
        Ok(self.state.read().posts.get(&post_id.value()).cloned())
    }

    async fn insert_post(&self, record: NewPost) -> RepositoryResult<Post> {
        let mut state = self.state.write();
        let id = next_post_id(&state.posts);
        let post = Post {
            post_id: PostId::new(id),
            title: record.title,
            contents: record.contents,
            image_url: record.image_url,
            author_id: record.author_id,
            created_at: record.created_at,
            views: 0,
            comments: Vec::new(),
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post_id: PostId, patch: PostPatch) -> RepositoryResult<Post> {
        let mut state = self.state.write();
        let post = state
            .posts
            .get_mut(&post_id.value())
            .ok_or_else(|| post_not_found("update_post", post_id))?;
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(contents) = patch.contents {
            post.contents = contents;
        }
        if let Some(url) = patch.image_url {
            post.image_url = Some(url);
        }
        if let Some(views) = patch.views {
            post.views = views;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<bool> {
        Ok(self.state.write().posts.remove(&post_id.value()).is_some())
    }

    async fn delete_posts_by_author(&self, author_id: UserId) -> RepositoryResult<u64> {
        let mut state = self.state.write();
        let before = state.posts.len();
        state.posts.retain(|_, p| p.author_id != author_id);
        Ok((before - state.posts.len()) as u64)
    }

    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        let state = self.state.read();
        let post = state
            .posts
            .get(&post_id.value())
            .ok_or_else(|| post_not_found("list_comments", post_id))?;
        Ok(post.comments.clone())
    }

    async fn find_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<Option<Comment>> {
        let state = self.state.read();
        let post = state
            .posts
            .get(&post_id.value())
            .ok_or_else(|| post_not_found("find_comment", post_id))?;
        Ok(post
            .comments
            .iter()
            .find(|c| c.comment_id == comment_id)
            .cloned())
    }

    async fn insert_comment(
        &self,
        post_id: PostId,
        record: NewComment,
    ) -> RepositoryResult<Comment> {
        let mut state = self.state.write();
        let post = state
            .posts
            .get_mut(&post_id.value())
            .ok_or_else(|| post_not_found("insert_comment", post_id))?;
        let comment = Comment {
            comment_id: CommentId::new(next_comment_id(&post.comments)),
            content: record.content,
            author_id: record.author_id,
            created_at: record.created_at,
        };
        post.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: String,
    ) -> RepositoryResult<Comment> {
        let mut state = self.state.write();
        let post = state
            .posts
            .get_mut(&post_id.value())
            .ok_or_else(|| post_not_found("update_comment", post_id))?;
        let comment = post
            .comments
            .iter_mut()
            .find(|c| c.comment_id == comment_id)
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("comment {} not found on post {}", comment_id, post_id),
                    ErrorContext::new("update_comment")
                        .with_entity("comment")
                        .with_entity_id(comment_id),
                )
            })?;
        comment.content = content;
        Ok(comment.clone())
    }

    async fn delete_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<bool> {
        let mut state = self.state.write();
        let post = state
            .posts
            .get_mut(&post_id.value())
            .ok_or_else(|| post_not_found("delete_comment", post_id))?;
        let before = post.comments.len();
        post.comments.retain(|c| c.comment_id != comment_id);
        Ok(post.comments.len() < before)
    }
}

#[async_trait]
impl BoardRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
