//! Cached sale transactions
//!
//! The registry is slow and rate limited, so sale batches are kept in
//! `real_transactions` keyed by (district code, period). Rows are never
//! updated or deleted here; identical records are skipped on insert.

use async_trait::async_trait;
use jeonse_common::time::{now, to_db_timestamp};
use jeonse_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::models::{AdministrativeCode, Period, SaleTransaction};
use crate::services::neighborhood_filter::filter_or_all;

/// Persistence-backed cache of sale transactions
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Cached sales for (code, period), or `None` when nothing is cached
    ///
    /// With a neighbourhood the rows are narrowed by fuzzy match, falling
    /// back to the full set when nothing matches.
    async fn load(
        &self,
        code: &AdministrativeCode,
        period: Period,
        neighborhood: Option<&str>,
    ) -> Result<Option<Vec<SaleTransaction>>>;

    /// Insert records not already cached; returns the number inserted
    ///
    /// All inserts of one call commit together or not at all.
    async fn save(
        &self,
        code: &AdministrativeCode,
        period: Period,
        region: &str,
        neighborhood: &str,
        records: &[SaleTransaction],
    ) -> Result<usize>;
}

/// SQLite-backed [`TransactionStore`]
#[derive(Clone)]
pub struct SqliteTransactionStore {
    pool: SqlitePool,
}

impl SqliteTransactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn sale_from_row(row: &SqliteRow) -> Result<SaleTransaction> {
    Ok(SaleTransaction {
        apt_name: row.try_get("apt_name")?,
        dong_name: row.try_get("dong_name")?,
        jibun: row.try_get("jibun")?,
        area: row.try_get("area")?,
        floor: row.try_get("floor")?,
        build_year: row.try_get("build_year")?,
        deal_date: row.try_get("deal_date")?,
        price: row.try_get("price")?,
        price_raw: row.try_get("price_raw")?,
        region_code: row.try_get("region_code")?,
    })
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    async fn load(
        &self,
        code: &AdministrativeCode,
        period: Period,
        neighborhood: Option<&str>,
    ) -> Result<Option<Vec<SaleTransaction>>> {
        let rows = sqlx::query(
            r#"
            SELECT apt_name, dong_name, jibun, area, floor, build_year,
                   deal_date, price, price_raw, region_code
            FROM real_transactions
            WHERE lawd_cd = ? AND deal_ymd = ?
            ORDER BY id
            "#,
        )
        .bind(code.as_str())
        .bind(period.to_string())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let sales = rows.iter().map(sale_from_row).collect::<Result<Vec<_>>>()?;
        Ok(Some(filter_or_all(sales, neighborhood)))
    }

    async fn save(
        &self,
        code: &AdministrativeCode,
        period: Period,
        region: &str,
        neighborhood: &str,
        records: &[SaleTransaction],
    ) -> Result<usize> {
        let period = period.to_string();
        let timestamp = to_db_timestamp(&now());
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for record in records {
            // `IS` so that a NULL price compares equal to NULL
            let exists: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT id FROM real_transactions
                WHERE lawd_cd = ? AND deal_ymd = ?
                  AND apt_name IS ? AND dong_name IS ?
                  AND price IS ? AND deal_date IS ?
                LIMIT 1
                "#,
            )
            .bind(code.as_str())
            .bind(&period)
            .bind(&record.apt_name)
            .bind(&record.dong_name)
            .bind(record.price)
            .bind(&record.deal_date)
            .fetch_optional(&mut *tx)
            .await?;

            if exists.is_some() {
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO real_transactions (
                    lawd_cd, deal_ymd, region, dong, apt_name, dong_name,
                    price, price_raw, area, floor, build_year, deal_date,
                    jibun, region_code, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(code.as_str())
            .bind(&period)
            .bind(region)
            .bind(neighborhood)
            .bind(&record.apt_name)
            .bind(&record.dong_name)
            .bind(record.price)
            .bind(&record.price_raw)
            .bind(&record.area)
            .bind(&record.floor)
            .bind(&record.build_year)
            .bind(&record.deal_date)
            .bind(&record.jibun)
            .bind(&record.region_code)
            .bind(&timestamp)
            .bind(&timestamp)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        debug!(code = %code, period = %period, inserted, total = records.len(), "Saved sale records");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeonse_common::db::connect_in_memory;

    fn sale(apt: &str, dong: &str, price: Option<i64>, date: &str) -> SaleTransaction {
        SaleTransaction {
            apt_name: apt.to_string(),
            dong_name: dong.to_string(),
            price,
            price_raw: price.map(|p| p.to_string()).unwrap_or_default(),
            deal_date: date.to_string(),
            ..Default::default()
        }
    }

    fn key() -> (AdministrativeCode, Period) {
        (AdministrativeCode::from("11680"), Period::new(2024, 3).unwrap())
    }

    async fn store() -> SqliteTransactionStore {
        SqliteTransactionStore::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let store = store().await;
        let (code, period) = key();
        assert!(store.load(&code, period, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_whole_save() {
        let store = store().await;
        let (code, period) = key();
        sqlx::query(
            r#"
            CREATE TRIGGER reject_marked BEFORE INSERT ON real_transactions
            WHEN NEW.apt_name = '거부'
            BEGIN SELECT RAISE(ABORT, 'rejected'); END
            "#,
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let records = vec![
            sale("은마", "대치동", Some(250_000), "2024-03-02"),
            sale("거부", "대치동", Some(90_000), "2024-03-03"),
        ];
        assert!(store.save(&code, period, "대치동", "대치동", &records).await.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM real_transactions")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(store.load(&code, period, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let store = store().await;
        let (code, period) = key();
        let records = vec![
            sale("은마", "대치동", Some(250_000), "2024-03-02"),
            sale("은마", "대치동", None, "2024-03-05"),
            sale("은마", "대치동", Some(250_000), "2024-03-02"),
        ];

        let first = store.save(&code, period, "대치동", "대치동", &records).await.unwrap();
        let second = store.save(&code, period, "대치동", "대치동", &records).await.unwrap();
        assert_eq!(first, 2);
        assert_eq!(second, 0);

        let loaded = store.load(&code, period, None).await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], records[0]);
    }

    #[tokio::test]
    async fn test_load_filter_never_empties() {
        let store = store().await;
        let (code, period) = key();
        let records = vec![
            sale("은마", "대치동", Some(1), "2024-03-01"),
            sale("아이파크", "삼성동", Some(2), "2024-03-01"),
            sale("래미안", "역삼동", Some(3), "2024-03-01"),
        ];
        store.save(&code, period, "강남구", "", &records).await.unwrap();

        let unmatched = store.load(&code, period, Some("청담동")).await.unwrap().unwrap();
        assert_eq!(unmatched.len(), 3);

        let matched = store.load(&code, period, Some("삼성동")).await.unwrap().unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].apt_name, "아이파크");
    }

    #[tokio::test]
    async fn test_periods_are_isolated() {
        let store = store().await;
        let (code, period) = key();
        store
            .save(&code, period, "대치동", "대치동", &[sale("은마", "대치동", Some(1), "")])
            .await
            .unwrap();

        assert!(store.load(&code, period.previous(), None).await.unwrap().is_none());
        assert!(store
            .load(&AdministrativeCode::from("11500"), period, None)
            .await
            .unwrap()
            .is_none());
    }
}
