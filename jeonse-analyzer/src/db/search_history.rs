//! Search history persistence

use chrono::{DateTime, Utc};
use jeonse_common::time::{from_db_timestamp, now, to_db_timestamp};
use jeonse_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// One recorded search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRecord {
    pub id: i64,
    pub region: String,
    pub risk_score: Option<i64>,
    pub searched_at: Option<DateTime<Utc>>,
}

/// Record a search; returns the new row id
pub async fn insert_search(pool: &SqlitePool, region: &str, risk_score: Option<i64>) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO search_history (region, risk_score, searched_at) VALUES (?, ?, ?)",
    )
    .bind(region)
    .bind(risk_score)
    .bind(to_db_timestamp(&now()))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Latest search per region, newest first
pub async fn recent_searches(pool: &SqlitePool, limit: i64) -> Result<Vec<SearchRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, region, risk_score, searched_at FROM search_history
        WHERE id IN (SELECT MAX(id) FROM search_history GROUP BY region)
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let searched_at: String = row.try_get("searched_at")?;
            Ok(SearchRecord {
                id: row.try_get("id")?,
                region: row.try_get("region")?,
                risk_score: row.try_get("risk_score")?,
                searched_at: from_db_timestamp(&searched_at),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeonse_common::db::connect_in_memory;

    #[tokio::test]
    async fn test_recent_searches_dedup_newest_first() {
        let pool = connect_in_memory().await.unwrap();
        insert_search(&pool, "대치동", Some(70)).await.unwrap();
        insert_search(&pool, "화곡동", None).await.unwrap();
        insert_search(&pool, "대치동", Some(75)).await.unwrap();

        let recent = recent_searches(&pool, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].region, "대치동");
        assert_eq!(recent[0].risk_score, Some(75));
        assert_eq!(recent[1].region, "화곡동");
        assert_eq!(recent[1].risk_score, None);
        assert!(recent[0].searched_at.is_some());

        assert_eq!(recent_searches(&pool, 1).await.unwrap().len(), 1);
    }
}
