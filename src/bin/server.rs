//! Agora HTTP Server Binary
//!
//! Main entry point for the community-board REST API. It selects and
//! initializes a storage backend, sets up the HTTP router, and starts
//! serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run over flat JSON files (default)
//! cargo run --bin agora-server
//!
//! # Run over SQLite
//! BOARD_DB_PATH=board.db cargo run --bin agora-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: server host (default: 0.0.0.0)
//! - `PORT`: server port (default: 3001)
//! - `REPOSITORY_TYPE`: "json", "sqlite" or "local" (default: json, or
//!   sqlite when `BOARD_DB_PATH` is set)
//! - `BOARD_DATA_DIR`: data directory for the JSON backend (default: data)
//! - `BOARD_DB_PATH`: database file for the SQLite backend
//! - `BOARD_CONFIG`: path to a board.toml overriding the above
//! - `UPLOADS_DIR`: directory for uploaded images (default: uploads)
//! - `CORS_ORIGIN`: allowed frontend origin (default: http://localhost:3000)
//! - `RUST_LOG`: log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use agora::db::RepositoryFactory;
use agora::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting Agora HTTP Server");

    // Select and initialize the storage backend: an explicit config file
    // wins, then a board.toml next to the binary, then the environment.
    let repository = match env::var("BOARD_CONFIG") {
        Ok(path) => RepositoryFactory::from_config_file(path),
        Err(_) if std::path::Path::new("board.toml").exists() => {
            RepositoryFactory::from_default_config()
        }
        Err(_) => RepositoryFactory::from_env(),
    }
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    info!("Repository initialized successfully");

    // Uploaded images live on disk and are served statically
    let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());
    tokio::fs::create_dir_all(&uploads_dir).await?;

    let cors_origin =
        env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let state = AppState::new(repository)
        .with_uploads_dir(uploads_dir)
        .with_cors_origin(cors_origin);

    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
