//! Repository factory for dependency injection.
//!
//! Creates repository instances from runtime configuration so the rest of
//! the application depends only on `Arc<dyn BoardRepository>`.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::BoardConfig;
#[cfg(feature = "json-repo")]
use super::repositories::{JsonConfig, JsonRepository};
#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::{SqliteConfig, SqliteRepository};
use super::repository::{BoardRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Flat-file JSON documents
    Json,
    /// Embedded SQLite
    Sqlite,
    /// In-memory repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "file" => Ok(Self::Json),
            "sqlite" | "sql" => Ok(Self::Sqlite),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variables.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Sqlite when `BOARD_DB_PATH` is
    /// set, otherwise Json, the flat-file layout existing deployments
    /// run on.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Json);
        }

        if std::env::var("BOARD_DB_PATH").is_ok() {
            Self::Sqlite
        } else {
            Self::Json
        }
    }
}

/// Factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance of the given type, configured from the
    /// environment.
    pub fn create(repo_type: RepositoryType) -> RepositoryResult<Arc<dyn BoardRepository>> {
        match repo_type {
            RepositoryType::Json => {
                #[cfg(feature = "json-repo")]
                {
                    Ok(Self::create_json(JsonConfig::from_env())?)
                }
                #[cfg(not(feature = "json-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "json repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    Ok(Self::create_sqlite(SqliteConfig::from_env())?)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "sqlite repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "local repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create a flat-file repository.
    #[cfg(feature = "json-repo")]
    pub fn create_json(config: JsonConfig) -> RepositoryResult<Arc<dyn BoardRepository>> {
        Ok(Arc::new(JsonRepository::new(config)?))
    }

    /// Create a SQLite repository, running pending migrations.
    #[cfg(feature = "sqlite-repo")]
    pub fn create_sqlite(config: SqliteConfig) -> RepositoryResult<Arc<dyn BoardRepository>> {
        Ok(Arc::new(SqliteRepository::new(config)?))
    }

    /// Create an in-memory local repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<dyn BoardRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository from environment configuration.
    pub fn from_env() -> RepositoryResult<Arc<dyn BoardRepository>> {
        Self::create(RepositoryType::from_env())
    }

    /// Create a repository from a `board.toml` configuration file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Arc<dyn BoardRepository>> {
        let config = BoardConfig::from_file(path)?;
        Self::from_board_config(&config)
    }

    /// Create a repository from `board.toml` in a standard location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn BoardRepository>> {
        let config = BoardConfig::from_default_location()?;
        Self::from_board_config(&config)
    }

    /// Create a repository from a parsed configuration.
    pub fn from_board_config(config: &BoardConfig) -> RepositoryResult<Arc<dyn BoardRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Json => {
                #[cfg(feature = "json-repo")]
                {
                    Self::create_json(config.to_json_config())
                }
                #[cfg(not(feature = "json-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "json repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    Self::create_sqlite(config.to_sqlite_config())
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "sqlite repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "local repository feature not enabled",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("json").unwrap(),
            RepositoryType::Json
        );
        assert_eq!(
            RepositoryType::from_str("file").unwrap(),
            RepositoryType::Json
        );
        assert_eq!(
            RepositoryType::from_str("Sqlite").unwrap(),
            RepositoryType::Sqlite
        );
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert!(RepositoryType::from_str("mysql").is_err());
    }

    #[cfg(feature = "local-repo")]
    #[tokio::test]
    async fn create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[cfg(feature = "json-repo")]
    #[tokio::test]
    async fn create_json_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let repo =
            RepositoryFactory::create_json(JsonConfig::with_dir(tmp.path())).unwrap();
        assert!(repo.health_check().await.unwrap());
    }
}
