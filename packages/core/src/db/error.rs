//! Database Error Types
//!
//! This module defines error types for graph store operations, providing
//! clear error handling for connection, validation, and query failures.

use crate::models::ValidationError;
use thiserror::Error;

/// Graph store operation errors
///
/// Covers connection setup, entity validation before writes, and query
/// execution. Service-level argument checks live in
/// [`crate::services::TreeServiceError`].
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish database connection
    #[error("Failed to connect to database at {endpoint}: {source}")]
    ConnectionFailed {
        endpoint: String,
        source: surrealdb::Error,
    },

    /// Endpoint scheme is not one of the enabled engines
    #[error("Unsupported database endpoint: {0}")]
    UnsupportedEndpoint(String),

    /// Entity constraints rejected the write
    #[error("Entity validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// SurrealDB query or transaction error
    #[error("Database operation failed: {0}")]
    Surreal(#[from] surrealdb::Error),

    /// Node id sequence did not return a value
    #[error("Failed to allocate node ids: {context}")]
    SequenceFailed { context: String },
}

impl DatabaseError {
    /// Create a connection failed error
    pub fn connection_failed(endpoint: impl Into<String>, source: surrealdb::Error) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Create an unsupported endpoint error
    pub fn unsupported_endpoint(endpoint: impl Into<String>) -> Self {
        Self::UnsupportedEndpoint(endpoint.into())
    }

    /// Create a sequence failure error
    pub fn sequence_failed(context: impl Into<String>) -> Self {
        Self::SequenceFailed {
            context: context.into(),
        }
    }
}
