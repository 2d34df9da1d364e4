//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations, separating
//! caller mistakes (bad arguments, invalid entities) from store failures.

use crate::db::DatabaseError;
use crate::models::ValidationError;
use thiserror::Error;

/// Tree service operation errors
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// Missing input, blank identifier or unknown node
    #[error("{0}")]
    InvalidArgument(String),

    /// Entity constraints rejected the node
    #[error("Node validation failed: {0}")]
    ValidationFailed(ValidationError),

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    DatabaseError(DatabaseError),
}

impl TreeServiceError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether the error was caused by the caller rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::ValidationFailed(_))
    }
}

impl From<ValidationError> for TreeServiceError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationFailed(err)
    }
}

// Validation failures detected by the store are reported as such
impl From<DatabaseError> for TreeServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Validation(validation) => Self::ValidationFailed(validation),
            other => Self::DatabaseError(other),
        }
    }
}
