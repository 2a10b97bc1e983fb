//! Notification persistence and the queries notifications are derived from

use chrono::{DateTime, Utc};
use jeonse_common::time::{from_db_timestamp, to_db_timestamp};
use jeonse_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// A stored notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub message: String,
    /// `danger`, `info`, ...
    pub kind: String,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

pub async fn insert_notification(
    pool: &SqlitePool,
    title: &str,
    message: &str,
    kind: &str,
    created_at: &DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, title, message, kind, is_read, created_at)
        VALUES (NULL, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(title)
    .bind(message)
    .bind(kind)
    .bind(to_db_timestamp(created_at))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Number of notifications created at or after `since`
pub async fn count_since(pool: &SqlitePool, since: &DateTime<Utc>) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE created_at >= ?")
        .bind(to_db_timestamp(since))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Whether an identical notification was created at or after `since`
pub async fn exists_since(
    pool: &SqlitePool,
    title: &str,
    message: &str,
    since: &DateTime<Utc>,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM notifications
        WHERE title = ? AND message = ? AND created_at >= ?
        LIMIT 1
        "#,
    )
    .bind(title)
    .bind(message)
    .bind(to_db_timestamp(since))
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Newest notifications first
pub async fn latest(pool: &SqlitePool, limit: i64) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, title, message, kind, is_read, created_at
        FROM notifications
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let created_at: String = row.try_get("created_at")?;
            let is_read: i64 = row.try_get("is_read")?;
            Ok(Notification {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                title: row.try_get("title")?,
                message: row.try_get("message")?,
                kind: row.try_get("kind")?,
                is_read: is_read != 0,
                created_at: from_db_timestamp(&created_at),
            })
        })
        .collect()
}

/// Regions with transactions cached at or after `since`, most recent first
///
/// Rows without a region fall back to their neighbourhood name.
pub async fn recently_cached_regions(
    pool: &SqlitePool,
    since: &DateTime<Utc>,
    limit: i64,
) -> Result<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT COALESCE(NULLIF(region, ''), NULLIF(dong_name, ''), '알 수 없음') AS label,
               COUNT(*) AS cnt
        FROM real_transactions
        WHERE created_at >= ?
        GROUP BY label
        ORDER BY MAX(id) DESC
        LIMIT ?
        "#,
    )
    .bind(to_db_timestamp(since))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jeonse_common::db::connect_in_memory;
    use jeonse_common::time::now;

    #[tokio::test]
    async fn test_insert_and_latest() {
        let pool = connect_in_memory().await.unwrap();
        let t0 = now() - Duration::hours(2);
        insert_notification(&pool, "a", "first", "info", &t0).await.unwrap();
        insert_notification(&pool, "b", "second", "danger", &now()).await.unwrap();

        let all = latest(&pool, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "b");
        assert!(!all[0].is_read);
        assert_eq!(all[0].user_id, None);

        let hour_ago = now() - Duration::hours(1);
        assert_eq!(count_since(&pool, &hour_ago).await.unwrap(), 1);
        assert!(exists_since(&pool, "a", "first", &(now() - Duration::days(1))).await.unwrap());
        assert!(!exists_since(&pool, "a", "first", &hour_ago).await.unwrap());
    }

    #[tokio::test]
    async fn test_recently_cached_regions() {
        let pool = connect_in_memory().await.unwrap();
        let ts = to_db_timestamp(&now());
        for (region, dong) in [("대치동", "대치동"), ("대치동", "대치동"), ("", "화곡동")] {
            sqlx::query(
                "INSERT INTO real_transactions (lawd_cd, deal_ymd, region, dong_name, created_at, updated_at) \
                 VALUES ('11680', '202403', ?, ?, ?, ?)",
            )
            .bind(region)
            .bind(dong)
            .bind(&ts)
            .bind(&ts)
            .execute(&pool)
            .await
            .unwrap();
        }

        let since = now() - Duration::days(1);
        let regions = recently_cached_regions(&pool, &since, 3).await.unwrap();
        assert_eq!(
            regions,
            vec![("화곡동".to_string(), 1), ("대치동".to_string(), 2)]
        );
    }
}
