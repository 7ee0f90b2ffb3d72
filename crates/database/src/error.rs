//! Database error types.

use relay_core::StorageError;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<DatabaseError> for StorageError {
    fn from(e: DatabaseError) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
