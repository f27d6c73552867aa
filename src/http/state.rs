//! Application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use crate::db::repository::BoardRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn BoardRepository>,
    /// Directory where uploaded images are written and served from
    pub uploads_dir: PathBuf,
    /// Origin allowed to call the API with credentials
    pub cors_origin: String,
}

impl AppState {
    /// Create application state with the given repository and defaults for
    /// the rest.
    pub fn new(repository: Arc<dyn BoardRepository>) -> Self {
        Self {
            repository,
            uploads_dir: PathBuf::from("uploads"),
            cors_origin: "http://localhost:3000".to_string(),
        }
    }

    /// Set the uploads directory.
    pub fn with_uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = dir.into();
        self
    }

    /// Set the allowed CORS origin.
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
