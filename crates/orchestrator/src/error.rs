//! Error types for orchestrator operations.

use relay_core::StorageError;
use thiserror::Error;

/// Errors that can occur while orchestrating a turn.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Missing or invalid process configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The storage backend failed during quota admission or a stats read.
    ///
    /// The turn must not proceed, and callers must not present this to
    /// the user as "limit reached".
    #[error("storage backend failure: {0}")]
    Storage(#[from] StorageError),
}
