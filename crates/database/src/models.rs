//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A per-user usage counter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QuotaRow {
    /// Platform user identifier.
    pub user_id: i64,
    /// Messages charged so far. Non-decreasing.
    pub count: i64,
    /// Last charge timestamp.
    pub updated_at: String,
}

/// A stored conversation entry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct HistoryRow {
    /// Write sequence; strictly increasing, orders entries within a user.
    pub seq: i64,
    /// Platform user identifier.
    pub user_id: i64,
    /// "user" or "assistant".
    pub role: String,
    /// Entry text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
}
