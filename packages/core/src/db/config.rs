//! Connection settings for the graph store.
//!
//! The endpoint URL selects the engine: `mem://` for an impermanent
//! in-process database, `rocksdb://<path>` for the embedded on-disk store,
//! `http://<host>:<port>` for a remote SurrealDB server.

use crate::db::DatabaseError;
use std::path::Path;

pub const DEFAULT_NAMESPACE: &str = "treegraph";
pub const DEFAULT_DATABASE: &str = "tree";

/// Storage engine selected by the endpoint scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Memory,
    RocksDb,
    Http,
}

/// Root credentials for a remote server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<Credentials>,
}

impl DatabaseConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            credentials: None,
        }
    }

    /// Impermanent in-process database, dropped with the last handle
    pub fn in_memory() -> Self {
        Self::new("mem://")
    }

    /// Embedded RocksDB database stored at `path`
    pub fn embedded(path: impl AsRef<Path>) -> Self {
        Self::new(format!("rocksdb://{}", path.as_ref().display()))
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Resolve the engine from the endpoint scheme
    pub fn engine(&self) -> Result<Engine, DatabaseError> {
        let scheme = self
            .endpoint
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| DatabaseError::unsupported_endpoint(&self.endpoint))?;

        match scheme.as_str() {
            "mem" | "memory" => Ok(Engine::Memory),
            "rocksdb" => Ok(Engine::RocksDb),
            "http" => Ok(Engine::Http),
            _ => Err(DatabaseError::unsupported_endpoint(&self.endpoint)),
        }
    }
}
