//! Server configuration loaded from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TREEGRAPH_HOST` | `127.0.0.1` |
//! | `TREEGRAPH_PORT` | `8080` |
//! | `TREEGRAPH_DB` | `rocksdb://<home>/.treegraph/database/treegraph.db` |
//! | `TREEGRAPH_DB_NAMESPACE` | `treegraph` |
//! | `TREEGRAPH_DB_DATABASE` | `tree` |
//! | `TREEGRAPH_DB_USER` / `TREEGRAPH_DB_PASS` | unset (remote only) |

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;
use treegraph_core::db::{DatabaseConfig, DatabaseError, Engine};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TREEGRAPH_PORT '{value}': {source}")]
    InvalidPort {
        value: String,
        source: ParseIntError,
    },

    #[error("Failed to get home directory for the default database path")]
    NoHomeDirectory,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Default embedded database location: `~/.treegraph/database/treegraph.db`
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".treegraph").join("database").join("treegraph.db"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source; empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("TREEGRAPH_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("TREEGRAPH_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        let mut database = match var("TREEGRAPH_DB") {
            Some(endpoint) => DatabaseConfig::new(endpoint),
            None => DatabaseConfig::embedded(
                default_database_path().ok_or(ConfigError::NoHomeDirectory)?,
            ),
        };
        if let Some(namespace) = var("TREEGRAPH_DB_NAMESPACE") {
            database.namespace = namespace;
        }
        if let Some(name) = var("TREEGRAPH_DB_DATABASE") {
            database.database = name;
        }
        if let (Some(user), Some(pass)) = (var("TREEGRAPH_DB_USER"), var("TREEGRAPH_DB_PASS")) {
            database = database.with_credentials(user, pass);
        }

        // Reject unknown schemes before anything is started
        database.engine()?;

        Ok(Self {
            host,
            port,
            database,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directory that must exist before an embedded database is opened
    pub fn database_directory(&self) -> Option<PathBuf> {
        match self.database.engine() {
            Ok(Engine::RocksDb) => self
                .database
                .endpoint
                .split_once("://")
                .map(|(_, path)| PathBuf::from(path))
                .and_then(|path| path.parent().map(PathBuf::from))
                .filter(|dir| !dir.as_os_str().is_empty()),
            _ => None,
        }
    }
}
