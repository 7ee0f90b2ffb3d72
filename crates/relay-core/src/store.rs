//! Backend traits consumed by the conversation store, quota gate, and
//! orchestrator.

use async_trait::async_trait;

use crate::entry::{ChatRole, ConversationEntry, PromptMessage, UserId};
use crate::error::{CompletionError, StorageError};

/// Storage primitives for per-user conversation history.
///
/// `append_and_trim` must be atomic with respect to concurrent calls for
/// the same user; operations for different users must not serialize
/// through a shared lock.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Append one entry, then evict everything beyond the newest
    /// `keep_last` entries for that user.
    async fn append_and_trim(
        &self,
        user_id: UserId,
        role: ChatRole,
        content: &str,
        keep_last: usize,
    ) -> Result<(), StorageError>;

    /// The newest `limit` entries, oldest first. Empty for unknown users.
    async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationEntry>, StorageError>;

    /// Drop all entries for a user.
    async fn clear(&self, user_id: UserId) -> Result<(), StorageError>;
}

/// Storage primitives for per-user usage counters.
#[async_trait]
pub trait QuotaBackend: Send + Sync {
    /// Atomically increment the counter if it is below `limit`.
    ///
    /// Returns whether the charge was applied. At or over the limit the
    /// counter is left untouched.
    async fn try_charge(&self, user_id: UserId, limit: u32) -> Result<bool, StorageError>;

    /// Current counter value; zero for unknown users.
    async fn count(&self, user_id: UserId) -> Result<u32, StorageError>;
}

/// A hosted chat-completion API.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate a reply for the given conversation.
    ///
    /// `conversation` holds the retained history plus the new user
    /// message, oldest first. Implementations prepend their configured
    /// system instruction and return the reply text trimmed of
    /// surrounding whitespace.
    async fn complete(&self, conversation: &[PromptMessage]) -> Result<String, CompletionError>;
}
