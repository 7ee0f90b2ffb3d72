//! Bounded per-user conversation history.

use std::sync::Arc;

use tracing::warn;

use crate::entry::{ChatRole, ConversationEntry, UserId};
use crate::error::StorageError;
use crate::store::HistoryBackend;

/// Rolling conversation history over a [`HistoryBackend`].
///
/// Retains at most `window` entries per user; older entries are evicted
/// at the backend on write, atomically per user.
pub struct ConversationStore {
    backend: Arc<dyn HistoryBackend>,
    window: usize,
}

impl ConversationStore {
    /// Create a store with the given retention window.
    pub fn new(backend: Arc<dyn HistoryBackend>, window: usize) -> Self {
        Self { backend, window }
    }

    /// The retained window for a user, oldest first.
    ///
    /// Unknown users get an empty history. A backend read failure is
    /// logged and also degrades to the empty history; the turn continues
    /// without context.
    pub async fn load_history(&self, user_id: UserId) -> Vec<ConversationEntry> {
        match self.backend.recent(user_id, self.window).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(user_id, error = %e, "history load failed, continuing with empty history");
                Vec::new()
            }
        }
    }

    /// Append one entry and evict anything beyond the window.
    pub async fn append_entry(
        &self,
        user_id: UserId,
        role: ChatRole,
        content: &str,
    ) -> Result<(), StorageError> {
        self.backend
            .append_and_trim(user_id, role, content, self.window)
            .await
    }

    /// Drop a user's history.
    pub async fn clear_history(&self, user_id: UserId) -> Result<(), StorageError> {
        self.backend.clear(user_id).await
    }

    /// Configured retention window.
    pub fn window(&self) -> usize {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;

    /// Backend whose reads and writes always fail.
    struct BrokenBackend;

    #[async_trait]
    impl HistoryBackend for BrokenBackend {
        async fn append_and_trim(
            &self,
            _user_id: UserId,
            _role: ChatRole,
            _content: &str,
            _keep_last: usize,
        ) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        async fn recent(
            &self,
            _user_id: UserId,
            _limit: usize,
        ) -> Result<Vec<ConversationEntry>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        async fn clear(&self, _user_id: UserId) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_window_is_enforced() {
        let store = ConversationStore::new(Arc::new(MemoryStore::new()), 4);

        for i in 0..9 {
            store
                .append_entry(1, ChatRole::User, &format!("msg-{i}"))
                .await
                .unwrap();
        }

        let history = store.load_history(1).await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "msg-5");
        assert_eq!(history[3].content, "msg-8");
    }

    #[tokio::test]
    async fn test_unknown_user_loads_empty() {
        let store = ConversationStore::new(Arc::new(MemoryStore::new()), 10);
        assert!(store.load_history(42).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_degrades_to_empty_on_backend_failure() {
        let store = ConversationStore::new(Arc::new(BrokenBackend), 10);
        assert!(store.load_history(42).await.is_empty());
    }

    #[tokio::test]
    async fn test_append_failure_is_surfaced() {
        let store = ConversationStore::new(Arc::new(BrokenBackend), 10);
        let result = store.append_entry(42, ChatRole::User, "hi").await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_clear_history() {
        let store = ConversationStore::new(Arc::new(MemoryStore::new()), 10);

        store.append_entry(1, ChatRole::User, "hi").await.unwrap();
        store.append_entry(1, ChatRole::Assistant, "hey").await.unwrap();
        store.clear_history(1).await.unwrap();

        assert!(store.load_history(1).await.is_empty());
    }
}
