//! Error types shared across the relay.

use thiserror::Error;

/// Errors from a storage backend.
///
/// A backend failure is never mapped to an allow/deny decision or an empty
/// result at this level; the caller decides how (and whether) to degrade.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend read or write failed (connection, query, I/O).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be interpreted.
    #[error("corrupt record for user {user_id}: {detail}")]
    Corrupt { user_id: i64, detail: String },
}

/// Errors from the hosted completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Missing or invalid client configuration.
    #[error("completion configuration error: {0}")]
    Configuration(String),

    /// The request could not be sent or timed out.
    #[error("completion request failed: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered 2xx but returned no choices.
    #[error("completion response contained no choices")]
    NoChoices,

    /// The response body could not be parsed.
    #[error("malformed completion response: {0}")]
    InvalidResponse(String),
}
