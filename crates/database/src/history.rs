//! Conversation history persistence.

use sqlx::SqlitePool;

use crate::models::HistoryRow;
use crate::Result;

/// Append one entry for a user and evict rows beyond the newest
/// `keep_last`, in a single transaction.
pub async fn append_and_trim(
    pool: &SqlitePool,
    user_id: i64,
    role: &str,
    content: &str,
    keep_last: usize,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO history (user_id, role, content)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(role)
    .bind(content)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM history
        WHERE seq IN (
            SELECT seq
            FROM history
            WHERE user_id = ?
            ORDER BY seq DESC
            LIMIT -1 OFFSET ?
        )
        "#,
    )
    .bind(user_id)
    .bind(keep_last as i64)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// The newest `limit` entries for a user, oldest first.
pub async fn recent(pool: &SqlitePool, user_id: i64, limit: usize) -> Result<Vec<HistoryRow>> {
    let mut rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT seq, user_id, role, content, created_at
        FROM history
        WHERE user_id = ?
        ORDER BY seq DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}

/// Delete all entries for a user. Returns the number of rows removed.
pub async fn clear(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM history
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Total stored entries across all users.
pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM history
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
