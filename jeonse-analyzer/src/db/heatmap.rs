//! Persisted heatmap scores

use async_trait::async_trait;
use jeonse_common::time::{from_db_timestamp, now, to_db_timestamp};
use jeonse_common::Result;
use sqlx::{Row, SqlitePool};

use crate::models::HeatmapEntry;

/// Storage for per-neighbourhood heatmap scores
#[async_trait]
pub trait HeatmapRepository: Send + Sync {
    /// Every persisted entry, ordered by region name
    async fn load_all(&self) -> Result<Vec<HeatmapEntry>>;

    /// Insert or overwrite entries by region name, in one transaction
    async fn upsert(&self, entries: &[HeatmapEntry]) -> Result<()>;

    async fn score_of(&self, region: &str) -> Result<Option<i64>>;

    /// Entries with `score >= min_score`, highest first
    async fn at_least(&self, min_score: i64, limit: i64) -> Result<Vec<HeatmapEntry>>;
}

/// SQLite-backed [`HeatmapRepository`]
#[derive(Clone)]
pub struct SqliteHeatmapRepository {
    pool: SqlitePool,
}

impl SqliteHeatmapRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<HeatmapEntry> {
    let updated_at: String = row.try_get("updated_at")?;
    Ok(HeatmapEntry {
        region: row.try_get("region")?,
        score: row.try_get("score")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        updated_at: from_db_timestamp(&updated_at),
    })
}

#[async_trait]
impl HeatmapRepository for SqliteHeatmapRepository {
    async fn load_all(&self) -> Result<Vec<HeatmapEntry>> {
        let rows = sqlx::query(
            "SELECT region, score, lat, lng, updated_at FROM heatmap_data ORDER BY region",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn upsert(&self, entries: &[HeatmapEntry]) -> Result<()> {
        let timestamp = to_db_timestamp(&now());
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO heatmap_data (region, score, lat, lng, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(region) DO UPDATE SET
                    score = excluded.score,
                    lat = excluded.lat,
                    lng = excluded.lng,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&entry.region)
            .bind(entry.score)
            .bind(entry.lat)
            .bind(entry.lng)
            .bind(&timestamp)
            .bind(&timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn score_of(&self, region: &str) -> Result<Option<i64>> {
        let score = sqlx::query_scalar("SELECT score FROM heatmap_data WHERE region = ?")
            .bind(region)
            .fetch_optional(&self.pool)
            .await?;
        Ok(score)
    }

    async fn at_least(&self, min_score: i64, limit: i64) -> Result<Vec<HeatmapEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT region, score, lat, lng, updated_at FROM heatmap_data
            WHERE score >= ?
            ORDER BY score DESC, region
            LIMIT ?
            "#,
        )
        .bind(min_score)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeonse_common::db::connect_in_memory;

    fn entry(region: &str, score: i64) -> HeatmapEntry {
        HeatmapEntry {
            region: region.to_string(),
            score,
            lat: 37.5,
            lng: 127.0,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_region() {
        let repo = SqliteHeatmapRepository::new(connect_in_memory().await.unwrap());
        repo.upsert(&[entry("대치동", 10), entry("역삼동", 20)]).await.unwrap();
        repo.upsert(&[entry("대치동", 85)]).await.unwrap();

        let all = repo.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.score_of("대치동").await.unwrap(), Some(85));
        assert!(all[0].updated_at.is_some());
        assert_eq!(repo.score_of("없는동").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_at_least_orders_by_score() {
        let repo = SqliteHeatmapRepository::new(connect_in_memory().await.unwrap());
        repo.upsert(&[entry("a", 81), entry("b", 95), entry("c", 40), entry("d", 80)])
            .await
            .unwrap();

        let high = repo.at_least(80, 2).await.unwrap();
        let names: Vec<&str> = high.iter().map(|e| e.region.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
