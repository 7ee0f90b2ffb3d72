//! Free-tier admission control.

use std::sync::Arc;

use tracing::debug;

use crate::entry::UserId;
use crate::error::StorageError;
use crate::store::QuotaBackend;

/// Usage snapshot for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Messages charged so far.
    pub used: u32,
    /// Free-tier message limit.
    pub limit: u32,
}

impl Usage {
    /// Messages left before the limit.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

/// Per-user admission control over a [`QuotaBackend`].
///
/// Every admitted turn charges the user's counter; a denied turn charges
/// nothing. A single configured admin identity bypasses the limit and is
/// never charged.
pub struct QuotaGate {
    backend: Arc<dyn QuotaBackend>,
    max_free_messages: u32,
    admin_user_id: Option<UserId>,
}

impl QuotaGate {
    /// Create a gate over the given backend.
    pub fn new(
        backend: Arc<dyn QuotaBackend>,
        max_free_messages: u32,
        admin_user_id: Option<UserId>,
    ) -> Self {
        Self {
            backend,
            max_free_messages,
            admin_user_id,
        }
    }

    /// Decide whether a turn for `user_id` may proceed, charging the
    /// counter if it may.
    ///
    /// A backend failure is returned as an error, never mapped to an
    /// allow or deny decision.
    pub async fn admit(&self, user_id: UserId) -> Result<bool, StorageError> {
        if self.admin_user_id == Some(user_id) {
            debug!(user_id, "admin identity admitted without charge");
            return Ok(true);
        }

        let admitted = self
            .backend
            .try_charge(user_id, self.max_free_messages)
            .await?;
        debug!(user_id, admitted, "quota admission");
        Ok(admitted)
    }

    /// Current usage for a user. Read-only; never charges.
    pub async fn usage(&self, user_id: UserId) -> Result<Usage, StorageError> {
        if self.admin_user_id == Some(user_id) {
            return Ok(Usage {
                used: 0,
                limit: self.max_free_messages,
            });
        }

        let used = self.backend.count(user_id).await?;
        Ok(Usage {
            used,
            limit: self.max_free_messages,
        })
    }

    /// Configured free-tier limit.
    pub fn limit(&self) -> u32 {
        self.max_free_messages
    }
}
