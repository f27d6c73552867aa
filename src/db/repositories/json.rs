//! Flat-file repository storing JSON documents.
//!
//! Two documents under a data directory, matching the layout existing
//! deployments already have on disk:
//!
//! - `accounts.json`: `{"users": [ ... ]}`
//! - `posts.json`: an object keyed by post ID, each post embedding its
//!   comments array
//!
//! Every verb is one read-modify-write cycle over a whole document. A
//! per-collection mutex serializes those cycles, so one writer's cycle
//! completes before the next begins. Writes land in a temp file that is
//! renamed over the document, so a failed save never leaves a truncated
//! file behind. All file I/O runs on the blocking pool and is bounded by
//! a configurable timeout.
//!
//! A missing or empty document is an empty collection. An unreadable
//! medium maps to `Unavailable`; malformed JSON maps to `Corrupt`.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    AccountRepository, BoardRepository, ErrorContext, PostRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, PostPatch, User, UserId,
    UserPatch,
};

const ACCOUNTS_FILE: &str = "accounts.json";
const POSTS_FILE: &str = "posts.json";

/// Configuration for the flat-file backend.
#[derive(Debug, Clone)]
pub struct JsonConfig {
    /// Directory holding `accounts.json` and `posts.json`
    pub data_dir: PathBuf,
    /// Upper bound on any single document read-modify-write, in seconds
    pub io_timeout_sec: u64,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            io_timeout_sec: 5,
        }
    }
}

impl JsonConfig {
    /// Create configuration from environment variables.
    ///
    /// - `BOARD_DATA_DIR`: data directory (default: `data`)
    /// - `BOARD_IO_TIMEOUT_SEC`: per-operation I/O timeout (default: 5)
    pub fn from_env() -> Self {
        let data_dir = std::env::var("BOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let io_timeout_sec = std::env::var("BOARD_IO_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);
        Self {
            data_dir,
            io_timeout_sec,
        }
    }

    /// Create a configuration rooted at the given directory.
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsDocument {
    #[serde(default)]
    users: Vec<User>,
}

type PostsDocument = BTreeMap<i64, Post>;

/// Flat-file implementation of the repository contract.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    accounts_path: PathBuf,
    posts_path: PathBuf,
    accounts_lock: Arc<Mutex<()>>,
    posts_lock: Arc<Mutex<()>>,
    io_timeout: Duration,
}

impl JsonRepository {
    /// Create a repository over the configured data directory. The
    /// directory is created if missing; the documents themselves are
    /// created lazily on first save.
    pub fn new(config: JsonConfig) -> RepositoryResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            RepositoryError::unavailable_with_context(
                e.to_string(),
                ErrorContext::new("create_data_dir")
                    .with_details(config.data_dir.display().to_string()),
            )
        })?;
        Ok(Self {
            accounts_path: config.data_dir.join(ACCOUNTS_FILE),
            posts_path: config.data_dir.join(POSTS_FILE),
            accounts_lock: Arc::new(Mutex::new(())),
            posts_lock: Arc::new(Mutex::new(())),
            io_timeout: Duration::from_secs(config.io_timeout_sec),
        })
    }

    /// Run one unit of work against the accounts document. The closure
    /// returns the result plus whether the document must be saved.
    async fn with_accounts<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Vec<User>) -> RepositoryResult<(T, bool)> + Send + 'static,
    {
        let path = self.accounts_path.clone();
        let lock = Arc::clone(&self.accounts_lock);
        self.run_blocking(operation, move || {
            let _guard = lock.lock();
            let mut doc: AccountsDocument = read_document(&path)?;
            let (result, dirty) = f(&mut doc.users)?;
            if dirty {
                write_document(&path, &doc)?;
            }
            Ok(result)
        })
        .await
    }

    /// Run one unit of work against the posts document.
    async fn with_posts<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PostsDocument) -> RepositoryResult<(T, bool)> + Send + 'static,
    {
        let path = self.posts_path.clone();
        let lock = Arc::clone(&self.posts_lock);
        self.run_blocking(operation, move || {
            let _guard = lock.lock();
            let mut doc: PostsDocument = read_document(&path)?;
            let (result, dirty) = f(&mut doc)?;
            if dirty {
                write_document(&path, &doc)?;
            }
            Ok(result)
        })
        .await
    }

    async fn run_blocking<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> RepositoryResult<T> + Send + 'static,
    {
        let joined = tokio::time::timeout(self.io_timeout, task::spawn_blocking(f))
            .await
            .map_err(|_| {
                RepositoryError::unavailable_with_context(
                    "file I/O timed out",
                    ErrorContext::new(operation),
                )
            })?;
        joined
            .map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Task join error: {}", e),
                    ErrorContext::new(operation),
                )
            })?
            .map_err(|e| e.with_operation(operation))
    }
}

fn read_document<T>(path: &Path) -> RepositoryResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        // Absent document = empty collection; it appears on first save.
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(RepositoryError::unavailable_with_context(
                e.to_string(),
                ErrorContext::default().with_details(path.display().to_string()),
            ))
        }
    };
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&text).map_err(|e| {
        RepositoryError::corrupt_with_context(
            e.to_string(),
            ErrorContext::default().with_details(path.display().to_string()),
        )
    })
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> RepositoryResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| RepositoryError::internal(format!("serialize document: {}", e)))?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, text).map_err(|e| {
        RepositoryError::unavailable_with_context(
            e.to_string(),
            ErrorContext::default().with_details(tmp.display().to_string()),
        )
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        RepositoryError::unavailable_with_context(
            e.to_string(),
            ErrorContext::default().with_details(path.display().to_string()),
        )
    })
}

fn next_user_id(users: &[User]) -> i64 {
    users.iter().map(|u| u.user_id.value()).max().unwrap_or(0) + 1
}

fn next_comment_id(comments: &[Comment]) -> i64 {
    comments
        .iter()
        .map(|c| c.comment_id.value())
        .max()
        .unwrap_or(0)
        + 1
}

fn user_not_found(user_id: UserId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("user {} not found", user_id),
        ErrorContext::default()
            .with_entity("user")
            .with_entity_id(user_id),
    )
}

fn post_not_found(post_id: PostId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("post {} not found", post_id),
        ErrorContext::default()
            .with_entity("post")
            .with_entity_id(post_id),
    )
}

fn comment_not_found(post_id: PostId, comment_id: CommentId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("comment {} not found on post {}", comment_id, post_id),
        ErrorContext::default()
            .with_entity("comment")
            .with_entity_id(comment_id),
    )
}

#[async_trait]
impl AccountRepository for JsonRepository {
    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.with_accounts("list_users", |users| Ok((users.clone(), false)))
            .await
    }

    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>> {
        self.with_accounts("find_user", move |users| {
            Ok((users.iter().find(|u| u.user_id == user_id).cloned(), false))
        })
        .await
    }

    async fn insert_user(&self, record: NewUser) -> RepositoryResult<User> {
        self.with_accounts("insert_user", move |users| {
            let user = User {
                user_id: UserId::new(next_user_id(users)),
                nickname: record.nickname,
                email: record.email,
                password: record.password,
                profile_image_url: record.profile_image_url,
            };
            users.push(user.clone());
            Ok((user, true))
        })
        .await
    }

    async fn update_user(&self, user_id: UserId, patch: UserPatch) -> RepositoryResult<User> {
        self.with_accounts("update_user", move |users| {
            let user = users
                .iter_mut()
                .find(|u| u.user_id == user_id)
                .ok_or_else(|| user_not_found(user_id))?;
            if let Some(nickname) = patch.nickname {
                user.nickname = nickname;
            }
            if let Some(password) = patch.password {
                user.password = password;
            }
            if let Some(url) = patch.profile_image_url {
                user.profile_image_url = Some(url);
            }
            Ok((user.clone(), true))
        })
        .await
    }

    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<bool> {
        self.with_accounts("delete_user", move |users| {
            let before = users.len();
            users.retain(|u| u.user_id != user_id);
            let removed = users.len() < before;
            Ok((removed, removed))
        })
        .await
    }
}

#[async_trait]
impl PostRepository for JsonRepository {
    async fn list_posts(&self) -> RepositoryResult<Vec<Post>> {
        self.with_posts("list_posts", |posts| {
            Ok((posts.values().cloned().collect(), false))
        })
        .await
    }

    async fn find_post(&self, post_id: PostId) -> RepositoryResult<Option<Post>> {
        self.with_posts("find_post", move |posts| {
            Ok((posts.get(&post_id.value()).cloned(), false))
        })
        .await
    }

    async fn insert_post(&self, record: NewPost) -> RepositoryResult<Post> {
        self.with_posts("insert_post", move |posts| {
            let id = posts.keys().max().copied().unwrap_or(0) + 1;
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
            posts.insert(id, post.clone());
            Ok((post, true))
        })
        .await
    }

    async fn update_post(&self, post_id: PostId, patch: PostPatch) -> RepositoryResult<Post> {
        self.with_posts("update_post", move |posts| {
            let post = posts
                .get_mut(&post_id.value())
                .ok_or_else(|| post_not_found(post_id))?;
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
            Ok((post.clone(), true))
        })
        .await
    }

    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<bool> {
        self.with_posts("delete_post", move |posts| {
            let removed = posts.remove(&post_id.value()).is_some();
            Ok((removed, removed))
        })
        .await
    }

    async fn delete_posts_by_author(&self, author_id: UserId) -> RepositoryResult<u64> {
        self.with_posts("delete_posts_by_author", move |posts| {
            let before = posts.len();
            posts.retain(|_, p| p.author_id != author_id);
            let removed = (before - posts.len()) as u64;
            Ok((removed, removed > 0))
        })
        .await
    }

    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        self.with_posts("list_comments", move |posts| {
            let post = posts
                .get(&post_id.value())
                .ok_or_else(|| post_not_found(post_id))?;
            Ok((post.comments.clone(), false))
        })
        .await
    }

    async fn find_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<Option<Comment>> {
        self.with_posts("find_comment", move |posts| {
            let post = posts
                .get(&post_id.value())
                .ok_or_else(|| post_not_found(post_id))?;
            Ok((
                post.comments
                    .iter()
                    .find(|c| c.comment_id == comment_id)
                    .cloned(),
                false,
            ))
        })
        .await
    }

    async fn insert_comment(
        &self,
        post_id: PostId,
        record: NewComment,
    ) -> RepositoryResult<Comment> {
        self.with_posts("insert_comment", move |posts| {
            let post = posts
                .get_mut(&post_id.value())
                .ok_or_else(|| post_not_found(post_id))?;
            let comment = Comment {
                comment_id: CommentId::new(next_comment_id(&post.comments)),
                content: record.content,
                author_id: record.author_id,
                created_at: record.created_at,
            };
            post.comments.push(comment.clone());
            Ok((comment, true))
        })
        .await
    }

    async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: String,
    ) -> RepositoryResult<Comment> {
        self.with_posts("update_comment", move |posts| {
            let post = posts
                .get_mut(&post_id.value())
                .ok_or_else(|| post_not_found(post_id))?;
            let comment = post
                .comments
                .iter_mut()
                .find(|c| c.comment_id == comment_id)
                .ok_or_else(|| comment_not_found(post_id, comment_id))?;
            comment.content = content;
            Ok((comment.clone(), true))
        })
        .await
    }

    async fn delete_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<bool> {
        self.with_posts("delete_comment", move |posts| {
            let post = posts
                .get_mut(&post_id.value())
                .ok_or_else(|| post_not_found(post_id))?;
            let before = post.comments.len();
            post.comments.retain(|c| c.comment_id != comment_id);
            let removed = post.comments.len() < before;
            Ok((removed, removed))
        })
        .await
    }
}

#[async_trait]
impl BoardRepository for JsonRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        // Readable (or absent) documents mean the store is serviceable.
        self.with_accounts("health_check", |_| Ok((true, false)))
            .await
    }
}
