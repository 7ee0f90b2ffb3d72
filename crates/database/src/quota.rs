//! Usage counter persistence.

use sqlx::SqlitePool;

use crate::models::QuotaRow;
use crate::Result;

/// Atomically charge one message against a user's counter if it is below
/// `limit`. Returns whether the charge was applied.
///
/// The conditional upsert runs as a single statement, so two concurrent
/// charges for the same user can never both slip under the limit, and a
/// rejected attempt touches nothing.
pub async fn try_charge(pool: &SqlitePool, user_id: i64, limit: u32) -> Result<bool> {
    // The insert arm would seed a fresh user with count = 1 regardless of
    // the limit; a zero limit admits nobody.
    if limit == 0 {
        return Ok(false);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO quota (user_id, count)
        VALUES (?, 1)
        ON CONFLICT(user_id) DO UPDATE SET
            count = count + 1,
            updated_at = datetime('now')
        WHERE count < ?
        "#,
    )
    .bind(user_id)
    .bind(limit as i64)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Current counter value for a user; zero if absent.
pub async fn get_count(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT count
        FROM quota
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(count.unwrap_or(0))
}

/// Fetch the full counter row for a user, if present.
pub async fn get_quota(pool: &SqlitePool, user_id: i64) -> Result<Option<QuotaRow>> {
    let record = sqlx::query_as::<_, QuotaRow>(
        r#"
        SELECT user_id, count, updated_at
        FROM quota
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        // In-memory SQLite is per-connection; a single connection keeps
        // every statement on the same database.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_fresh_user_has_zero_count() {
        let db = test_db().await;
        assert_eq!(get_count(db.pool(), 42).await.unwrap(), 0);
        assert!(get_quota(db.pool(), 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_charge_until_limit() {
        let db = test_db().await;

        for expected in 1..=3 {
            assert!(try_charge(db.pool(), 42, 3).await.unwrap());
            assert_eq!(get_count(db.pool(), 42).await.unwrap(), expected);
        }

        // At the limit: denied, and the counter does not move.
        assert!(!try_charge(db.pool(), 42, 3).await.unwrap());
        assert!(!try_charge(db.pool(), 42, 3).await.unwrap());
        assert_eq!(get_count(db.pool(), 42).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_zero_limit_denies_fresh_user() {
        let db = test_db().await;

        assert!(!try_charge(db.pool(), 42, 0).await.unwrap());
        assert!(get_quota(db.pool(), 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_counters_are_per_user() {
        let db = test_db().await;

        assert!(try_charge(db.pool(), 1, 1).await.unwrap());
        assert!(!try_charge(db.pool(), 1, 1).await.unwrap());
        assert!(try_charge(db.pool(), 2, 1).await.unwrap());

        assert_eq!(get_count(db.pool(), 1).await.unwrap(), 1);
        assert_eq!(get_count(db.pool(), 2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_quota_row_fields() {
        let db = test_db().await;

        try_charge(db.pool(), 42, 15).await.unwrap();
        let row = get_quota(db.pool(), 42).await.unwrap().unwrap();
        assert_eq!(row.user_id, 42);
        assert_eq!(row.count, 1);
        assert!(!row.updated_at.is_empty());
    }
}
