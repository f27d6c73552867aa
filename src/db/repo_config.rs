//! Board configuration file support.
//!
//! Reads backend selection and storage settings from a `board.toml` file:
//!
//! ```toml
//! [repository]
//! type = "json"            # "json" | "sqlite" | "local"
//!
//! [json]
//! data_dir = "data"
//! io_timeout_sec = 5
//!
//! [sqlite]
//! db_path = "board.db"
//! max_pool_size = 8
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Board configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub json: JsonSettings,
    #[serde(default)]
    pub sqlite: SqliteSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Flat-file backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_io_timeout_sec")]
    pub io_timeout_sec: u64,
}

/// SQLite backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSettings {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            io_timeout_sec: default_io_timeout_sec(),
        }
    }
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_pool_size: default_max_pool_size(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_io_timeout_sec() -> u64 {
    5
}

fn default_db_path() -> PathBuf {
    PathBuf::from("board.db")
}

fn default_max_pool_size() -> u32 {
    8
}

impl BoardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: BoardConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `board.toml` in the current directory, then the parent.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [PathBuf::from("board.toml"), PathBuf::from("../board.toml")];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No board.toml found in standard locations",
        ))
    }

    /// Parse the configured repository type.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Flat-file backend configuration.
    #[cfg(feature = "json-repo")]
    pub fn to_json_config(&self) -> super::repositories::JsonConfig {
        super::repositories::JsonConfig {
            data_dir: self.json.data_dir.clone(),
            io_timeout_sec: self.json.io_timeout_sec,
        }
    }

    /// SQLite backend configuration.
    #[cfg(feature = "sqlite-repo")]
    pub fn to_sqlite_config(&self) -> super::repositories::SqliteConfig {
        super::repositories::SqliteConfig {
            db_path: self.sqlite.db_path.clone(),
            max_pool_size: self.sqlite.max_pool_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let toml_str = r#"
            [repository]
            type = "sqlite"

            [json]
            data_dir = "/var/board/data"

            [sqlite]
            db_path = "/var/board/board.db"
            max_pool_size = 4
        "#;
        let config: BoardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Sqlite);
        assert_eq!(config.sqlite.max_pool_size, 4);
        assert_eq!(config.json.io_timeout_sec, 5);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let toml_str = r#"
            [repository]
            type = "json"
        "#;
        let config: BoardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Json);
        assert_eq!(config.json.data_dir, PathBuf::from("data"));
        assert_eq!(config.sqlite.db_path, PathBuf::from("board.db"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let toml_str = r#"
            [repository]
            type = "mongodb"
        "#;
        let config: BoardConfig = toml::from_str(toml_str).unwrap();
        assert!(config.repository_type().is_err());
    }

    #[test]
    fn from_file_reads_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("board.toml");
        std::fs::write(&path, "[repository]\ntype = \"local\"\n").unwrap();
        let config = BoardConfig::from_file(&path).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    }
}
