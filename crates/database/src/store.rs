//! Backend trait implementations over the SQLite pool.

use async_trait::async_trait;
use relay_core::{
    ChatRole, ConversationEntry, HistoryBackend, QuotaBackend, StorageError, UserId,
};

use crate::{history, quota, Database};

/// SQLite-backed storage for the conversation store and quota gate.
///
/// Cheap to clone; all clones share the underlying pool. Per-user
/// atomicity comes from single-statement counter updates and
/// single-transaction appends, so different users never contend on a lock
/// held in this process.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wrap a connected database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl HistoryBackend for SqliteStore {
    async fn append_and_trim(
        &self,
        user_id: UserId,
        role: ChatRole,
        content: &str,
        keep_last: usize,
    ) -> Result<(), StorageError> {
        history::append_and_trim(self.db.pool(), user_id, role.as_str(), content, keep_last)
            .await
            .map_err(StorageError::from)
    }

    async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationEntry>, StorageError> {
        let rows = history::recent(self.db.pool(), user_id, limit)
            .await
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| {
                let role = ChatRole::parse(&row.role).ok_or_else(|| StorageError::Corrupt {
                    user_id,
                    detail: format!("unknown role {:?} at seq {}", row.role, row.seq),
                })?;
                Ok(ConversationEntry {
                    role,
                    content: row.content,
                    seq: row.seq,
                })
            })
            .collect()
    }

    async fn clear(&self, user_id: UserId) -> Result<(), StorageError> {
        history::clear(self.db.pool(), user_id)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

#[async_trait]
impl QuotaBackend for SqliteStore {
    async fn try_charge(&self, user_id: UserId, limit: u32) -> Result<bool, StorageError> {
        quota::try_charge(self.db.pool(), user_id, limit)
            .await
            .map_err(StorageError::from)
    }

    async fn count(&self, user_id: UserId) -> Result<u32, StorageError> {
        let count = quota::get_count(self.db.pool(), user_id)
            .await
            .map_err(StorageError::from)?;
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteStore {
        // In-memory SQLite is per-connection; a single connection keeps
        // every statement on the same database.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        SqliteStore::new(db)
    }

    #[tokio::test]
    async fn test_roles_round_trip_through_storage() {
        let store = test_store().await;

        store
            .append_and_trim(1, ChatRole::User, "hi", 10)
            .await
            .unwrap();
        store
            .append_and_trim(1, ChatRole::Assistant, "hey", 10)
            .await
            .unwrap();

        let entries = store.recent(1, 10).await.unwrap();
        assert_eq!(entries[0].role, ChatRole::User);
        assert_eq!(entries[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_unknown_role_is_corrupt_not_defaulted() {
        let store = test_store().await;

        sqlx::query("INSERT INTO history (user_id, role, content) VALUES (1, 'wizard', 'zap')")
            .execute(store.database().pool())
            .await
            .unwrap();

        let result = store.recent(1, 10).await;
        assert!(matches!(result, Err(StorageError::Corrupt { user_id: 1, .. })));
    }

    #[tokio::test]
    async fn test_quota_backend_over_sqlite() {
        let store = test_store().await;

        assert!(store.try_charge(42, 2).await.unwrap());
        assert!(store.try_charge(42, 2).await.unwrap());
        assert!(!store.try_charge(42, 2).await.unwrap());
        assert_eq!(store.count(42).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_window_enforced_through_trait() {
        let store = test_store().await;

        for i in 0..9 {
            store
                .append_and_trim(1, ChatRole::User, &format!("msg-{i}"), 4)
                .await
                .unwrap();
        }

        let entries = store.recent(1, 4).await.unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].content, "msg-5");
        assert_eq!(entries[3].content, "msg-8");
    }
}
