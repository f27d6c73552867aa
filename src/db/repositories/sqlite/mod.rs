//! Relational repository backed by embedded SQLite.
//!
//! The same logical collections as the flat-file backend, normalized into
//! `users`, `posts`, and `post_comments` tables. Every verb maps to
//! parameterized statements inside a transaction and must leave the same
//! before/after state the flat-file backend would for the same logical
//! operation.
//!
//! Connections come from an r2d2 pool; statements run on the blocking
//! pool. Migrations are embedded SQL applied once at startup through a
//! `schema_version` table.

use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::PathBuf;
use tokio::task;

use crate::db::repository::{
    AccountRepository, BoardRepository, ErrorContext, PostRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{
    Comment, CommentId, NewComment, NewPost, NewUser, Post, PostId, PostPatch, User, UserId,
    UserPatch,
};

type SqlitePool = Pool<SqliteConnectionManager>;

const MIGRATIONS: &[(&str, &str)] = &[("001_initial", include_str!("migrations/001_initial.sql"))];

/// Configuration for the SQLite backend.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path
    pub db_path: PathBuf,
    /// Maximum number of pooled connections
    pub max_pool_size: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("board.db"),
            max_pool_size: 8,
        }
    }
}

impl SqliteConfig {
    /// Create configuration from environment variables.
    ///
    /// - `BOARD_DB_PATH`: database file path (default: `board.db`)
    /// - `BOARD_POOL_MAX`: maximum pool size (default: 8)
    pub fn from_env() -> Self {
        let db_path = std::env::var("BOARD_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("board.db"));
        let max_pool_size = std::env::var("BOARD_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(8);
        Self {
            db_path,
            max_pool_size,
        }
    }

    /// Create a configuration for the given database file.
    pub fn with_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }
}

/// SQLite implementation of the repository contract.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (or create) the database file and run pending migrations.
    pub fn new(config: SqliteConfig) -> RepositoryResult<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RepositoryError::unavailable_with_context(
                        e.to_string(),
                        ErrorContext::new("create_db_dir"),
                    )
                })?;
            }
        }

        let manager = SqliteConnectionManager::file(&config.db_path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .build(manager)?;

        let repo = Self { pool };
        repo.run_migrations()?;
        Ok(repo)
    }

    /// An in-memory database for tests. Pool size is pinned to one so all
    /// statements see the same database.
    pub fn in_memory() -> RepositoryResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder().max_size(1).build(manager)?;
        let repo = Self { pool };
        repo.run_migrations()?;
        Ok(repo)
    }

    fn run_migrations(&self) -> RepositoryResult<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;

        for (name, sql) in MIGRATIONS {
            let already_applied: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if !already_applied {
                tracing::info!("Applying migration: {}", name);
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO schema_version (name) VALUES (?1)",
                    params![name],
                )?;
            }
        }
        Ok(())
    }

    /// Run a statement batch on the blocking pool with a pooled connection.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation),
            )
        })?
        .map_err(|e| e.with_operation(operation))
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: UserId::new(row.get(0)?),
        nickname: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        profile_image_url: row.get(4)?,
    })
}

fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        comment_id: CommentId::new(row.get(0)?),
        content: row.get(1)?,
        author_id: UserId::new(row.get(2)?),
        created_at: row.get(3)?,
    })
}

/// Post row without its comments; callers attach them separately.
fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        post_id: PostId::new(row.get(0)?),
        title: row.get(1)?,
        contents: row.get(2)?,
        image_url: row.get(3)?,
        author_id: UserId::new(row.get(4)?),
        created_at: row.get(5)?,
        views: row.get(6)?,
        comments: Vec::new(),
    })
}

fn comments_for(conn: &Connection, post_id: i64) -> RepositoryResult<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT comment_id, content, author_id, created_at
         FROM post_comments WHERE post_id = ?1 ORDER BY comment_id",
    )?;
    let rows = stmt.query_map(params![post_id], row_to_comment)?;
    let mut comments = Vec::new();
    for row in rows {
        comments.push(row?);
    }
    Ok(comments)
}

fn post_exists(tx: &Connection, post_id: i64) -> RepositoryResult<bool> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT post_id FROM posts WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
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

fn fetch_post(tx: &Transaction<'_>, post_id: PostId) -> RepositoryResult<Option<Post>> {
    let post = tx
        .query_row(
            "SELECT post_id, title, contents, image_url, author_id, created_at, views
             FROM posts WHERE post_id = ?1",
            params![post_id.value()],
            row_to_post,
        )
        .optional()?;
    match post {
        Some(mut post) => {
            post.comments = comments_for(tx, post_id.value())?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.with_conn("list_users", |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, nickname, email, password, profile_image_url
                 FROM users ORDER BY user_id",
            )?;
            let rows = stmt.query_map([], row_to_user)?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
    }

    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>> {
        self.with_conn("find_user", move |conn| {
            let user = conn
                .query_row(
                    "SELECT user_id, nickname, email, password, profile_image_url
                     FROM users WHERE user_id = ?1",
                    params![user_id.value()],
                    row_to_user,
                )
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn insert_user(&self, record: NewUser) -> RepositoryResult<User> {
        self.with_conn("insert_user", move |conn| {
            let tx = conn.transaction()?;
            // max+1 inside the transaction; no separate counter
            let next_id: i64 = tx.query_row(
                "SELECT COALESCE(MAX(user_id), 0) + 1 FROM users",
                [],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO users (user_id, nickname, email, password, profile_image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    next_id,
                    record.nickname,
                    record.email,
                    record.password,
                    record.profile_image_url
                ],
            )?;
            tx.commit()?;
            Ok(User {
                user_id: UserId::new(next_id),
                nickname: record.nickname,
                email: record.email,
                password: record.password,
                profile_image_url: record.profile_image_url,
            })
        })
        .await
    }

    async fn update_user(&self, user_id: UserId, patch: UserPatch) -> RepositoryResult<User> {
        self.with_conn("update_user", move |conn| {
            let tx = conn.transaction()?;
            let mut user = tx
                .query_row(
                    "SELECT user_id, nickname, email, password, profile_image_url
                     FROM users WHERE user_id = ?1",
                    params![user_id.value()],
                    row_to_user,
                )
                .optional()?
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
            tx.execute(
                "UPDATE users SET nickname = ?2, password = ?3, profile_image_url = ?4
                 WHERE user_id = ?1",
                params![
                    user_id.value(),
                    user.nickname,
                    user.password,
                    user.profile_image_url
                ],
            )?;
            tx.commit()?;
            Ok(user)
        })
        .await
    }

    async fn delete_user(&self, user_id: UserId) -> RepositoryResult<bool> {
        self.with_conn("delete_user", move |conn| {
            let changed = conn.execute(
                "DELETE FROM users WHERE user_id = ?1",
                params![user_id.value()],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}

#[async_trait]
impl PostRepository for SqliteRepository {
    async fn list_posts(&self) -> RepositoryResult<Vec<Post>> {
        self.with_conn("list_posts", |conn| {
            let mut stmt = conn.prepare(
                "SELECT post_id, title, contents, image_url, author_id, created_at, views
                 FROM posts ORDER BY post_id",
            )?;
            let rows = stmt.query_map([], row_to_post)?;
            let mut posts = Vec::new();
            for row in rows {
                posts.push(row?);
            }
            drop(stmt);
            for post in &mut posts {
                post.comments = comments_for(conn, post.post_id.value())?;
            }
            Ok(posts)
        })
        .await
    }

    async fn find_post(&self, post_id: PostId) -> RepositoryResult<Option<Post>> {
        self.with_conn("find_post", move |conn| {
            let tx = conn.transaction()?;
            let post = fetch_post(&tx, post_id)?;
            tx.commit()?;
            Ok(post)
        })
        .await
    }

    async fn insert_post(&self, record: NewPost) -> RepositoryResult<Post> {
        self.with_conn("insert_post", move |conn| {
            let tx = conn.transaction()?;
            let next_id: i64 = tx.query_row(
                "SELECT COALESCE(MAX(post_id), 0) + 1 FROM posts",
                [],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO posts (post_id, title, contents, image_url, author_id, created_at, views)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![
                    next_id,
                    record.title,
                    record.contents,
                    record.image_url,
                    record.author_id.value(),
                    record.created_at
                ],
            )?;
            tx.commit()?;
            Ok(Post {
                post_id: PostId::new(next_id),
                title: record.title,
                contents: record.contents,
                image_url: record.image_url,
                author_id: record.author_id,
                created_at: record.created_at,
                views: 0,
                comments: Vec::new(),
            })
        })
        .await
    }

    async fn update_post(&self, post_id: PostId, patch: PostPatch) -> RepositoryResult<Post> {
        self.with_conn("update_post", move |conn| {
            let tx = conn.transaction()?;
            let mut post = fetch_post(&tx, post_id)?.ok_or_else(|| post_not_found(post_id))?;
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
            tx.execute(
                "UPDATE posts SET title = ?2, contents = ?3, image_url = ?4, views = ?5
                 WHERE post_id = ?1",
                params![
                    post_id.value(),
                    post.title,
                    post.contents,
                    post.image_url,
                    post.views
                ],
            )?;
            tx.commit()?;
            Ok(post)
        })
        .await
    }

    async fn delete_post(&self, post_id: PostId) -> RepositoryResult<bool> {
        self.with_conn("delete_post", move |conn| {
            // ON DELETE CASCADE clears the post's comment rows
            let changed = conn.execute(
                "DELETE FROM posts WHERE post_id = ?1",
                params![post_id.value()],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_posts_by_author(&self, author_id: UserId) -> RepositoryResult<u64> {
        self.with_conn("delete_posts_by_author", move |conn| {
            let changed = conn.execute(
                "DELETE FROM posts WHERE author_id = ?1",
                params![author_id.value()],
            )?;
            Ok(changed as u64)
        })
        .await
    }

    async fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        self.with_conn("list_comments", move |conn| {
            if !post_exists(conn, post_id.value())? {
                return Err(post_not_found(post_id));
            }
            comments_for(conn, post_id.value())
        })
        .await
    }

    async fn find_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<Option<Comment>> {
        self.with_conn("find_comment", move |conn| {
            if !post_exists(conn, post_id.value())? {
                return Err(post_not_found(post_id));
            }
            let comment = conn
                .query_row(
                    "SELECT comment_id, content, author_id, created_at
                     FROM post_comments WHERE post_id = ?1 AND comment_id = ?2",
                    params![post_id.value(), comment_id.value()],
                    row_to_comment,
                )
                .optional()?;
            Ok(comment)
        })
        .await
    }

    async fn insert_comment(
        &self,
        post_id: PostId,
        record: NewComment,
    ) -> RepositoryResult<Comment> {
        self.with_conn("insert_comment", move |conn| {
            let tx = conn.transaction()?;
            if !post_exists(&tx, post_id.value())? {
                return Err(post_not_found(post_id));
            }
            // max+1 scoped to the parent post
            let next_id: i64 = tx.query_row(
                "SELECT COALESCE(MAX(comment_id), 0) + 1 FROM post_comments WHERE post_id = ?1",
                params![post_id.value()],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO post_comments (post_id, comment_id, content, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    post_id.value(),
                    next_id,
                    record.content,
                    record.author_id.value(),
                    record.created_at
                ],
            )?;
            tx.commit()?;
            Ok(Comment {
                comment_id: CommentId::new(next_id),
                content: record.content,
                author_id: record.author_id,
                created_at: record.created_at,
            })
        })
        .await
    }

    async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: String,
    ) -> RepositoryResult<Comment> {
        self.with_conn("update_comment", move |conn| {
            let tx = conn.transaction()?;
            if !post_exists(&tx, post_id.value())? {
                return Err(post_not_found(post_id));
            }
            let changed = tx.execute(
                "UPDATE post_comments SET content = ?3 WHERE post_id = ?1 AND comment_id = ?2",
                params![post_id.value(), comment_id.value(), content],
            )?;
            if changed == 0 {
                return Err(comment_not_found(post_id, comment_id));
            }
            let comment = tx.query_row(
                "SELECT comment_id, content, author_id, created_at
                 FROM post_comments WHERE post_id = ?1 AND comment_id = ?2",
                params![post_id.value(), comment_id.value()],
                row_to_comment,
            )?;
            tx.commit()?;
            Ok(comment)
        })
        .await
    }

    async fn delete_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> RepositoryResult<bool> {
        self.with_conn("delete_comment", move |conn| {
            if !post_exists(conn, post_id.value())? {
                return Err(post_not_found(post_id));
            }
            let changed = conn.execute(
                "DELETE FROM post_comments WHERE post_id = ?1 AND comment_id = ?2",
                params![post_id.value(), comment_id.value()],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}

#[async_trait]
impl BoardRepository for SqliteRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
        .await
    }
}
