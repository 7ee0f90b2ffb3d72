//! In-process storage backend.
//!
//! History and counters live in per-user buckets reached through a
//! briefly-held map lock; mutations take only the owning user's lock, so
//! operations for different users do not contend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::entry::{ChatRole, ConversationEntry, UserId};
use crate::error::StorageError;
use crate::store::{HistoryBackend, QuotaBackend};

#[derive(Debug, Default)]
struct UserState {
    entries: VecDeque<ConversationEntry>,
    count: u32,
}

/// In-memory backend for tests and single-process development setups.
///
/// State does not survive a restart; deployments use the SQLite backend
/// from the `database` crate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, Arc<Mutex<UserState>>>>,
    next_seq: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with any tracked state.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    async fn user_state(&self, user_id: UserId) -> Arc<Mutex<UserState>> {
        {
            let users = self.users.read().await;
            if let Some(state) = users.get(&user_id) {
                return state.clone();
            }
        }

        let mut users = self.users.write().await;
        users.entry(user_id).or_default().clone()
    }
}

#[async_trait]
impl HistoryBackend for MemoryStore {
    async fn append_and_trim(
        &self,
        user_id: UserId,
        role: ChatRole,
        content: &str,
        keep_last: usize,
    ) -> Result<(), StorageError> {
        let state = self.user_state(user_id).await;
        let mut state = state.lock().await;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        state.entries.push_back(ConversationEntry {
            role,
            content: content.to_string(),
            seq,
        });

        while state.entries.len() > keep_last {
            state.entries.pop_front();
        }

        Ok(())
    }

    async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationEntry>, StorageError> {
        let state = self.user_state(user_id).await;
        let state = state.lock().await;

        let skip = state.entries.len().saturating_sub(limit);
        Ok(state.entries.iter().skip(skip).cloned().collect())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), StorageError> {
        let state = self.user_state(user_id).await;
        state.lock().await.entries.clear();
        Ok(())
    }
}

#[async_trait]
impl QuotaBackend for MemoryStore {
    async fn try_charge(&self, user_id: UserId, limit: u32) -> Result<bool, StorageError> {
        let state = self.user_state(user_id).await;
        let mut state = state.lock().await;

        if state.count >= limit {
            return Ok(false);
        }
        state.count += 1;
        Ok(true)
    }

    async fn count(&self, user_id: UserId) -> Result<u32, StorageError> {
        let state = self.user_state(user_id).await;
        let count = state.lock().await.count;
        Ok(count)
    }
}
