//! HTTP server module for the community board.
//!
//! An axum-based REST API over the service layer and repository pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing, identity cookies, multipart uploads   │
//! │  - JSON serialization, CORS, error mapping                │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Uniqueness, authorization, cascade rules               │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - JsonRepository / SqliteRepository / LocalRepository    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod auth;

pub mod dto;

pub mod error;

pub mod handlers;

pub mod router;

pub mod state;

pub mod uploads;

pub use router::create_router;

pub use state::AppState;
