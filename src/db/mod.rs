//! Storage layer for board data.
//!
//! This module provides abstractions for storage operations via the
//! Repository pattern, allowing different backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services/) - Business Rules              │
//! │  - Uniqueness checks                                     │
//! │  - Authorization before mutation                         │
//! │  - Cascade delete ordering                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼────────────────┐
//!     ▼               ▼                ▼
//!   Json            Sqlite           Local
//! (flat files)    (relational)    (in-memory)
//! ```
//!
//! All backends satisfy one contract: identical before/after states for
//! each verb, max+1 ID assignment inside the insert's unit of work, and a
//! post delete that removes the post's comments with it.
//!
//! # Recommended Usage
//!
//! ```ignore
//! use agora::db::{RepositoryFactory, RepositoryType};
//! use agora::services::accounts;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let repo = RepositoryFactory::create(RepositoryType::Json)?;
//!     let users = accounts::get_all(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "json-repo", feature = "sqlite-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::BoardConfig;
#[cfg(feature = "json-repo")]
pub use repositories::{JsonConfig, JsonRepository};
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::{SqliteConfig, SqliteRepository};
pub use repository::{
    AccountRepository, BoardRepository, ErrorContext, PostRepository, RepositoryError,
    RepositoryResult,
};
