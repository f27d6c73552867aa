//! Repository implementations module.
//!
//! This module contains the implementations of the repository contract:
//! - `json`: flat-file backend storing JSON documents
//! - `sqlite`: relational backend on embedded SQLite
//! - `local`: in-memory backend for unit testing and local development
#[cfg(feature = "json-repo")]
pub mod json;
#[cfg(feature = "local-repo")]
pub mod local;
#[cfg(feature = "sqlite-repo")]
pub mod sqlite;

#[cfg(feature = "json-repo")]
pub use json::{JsonConfig, JsonRepository};
#[cfg(feature = "local-repo")]
pub use local::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use sqlite::{SqliteConfig, SqliteRepository};
