//! Administrative removal of everything stored for a region

use jeonse_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Rows removed per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub heatmap: u64,
    pub search_history: u64,
    pub transactions: u64,
}

/// Delete the heatmap row, search history and cached transactions of a region
///
/// Cached transactions match when their region equals `region` or their
/// neighbourhood name contains it. Everything is removed in one transaction.
pub async fn purge_region(pool: &SqlitePool, region: &str) -> Result<PurgeSummary> {
    let region = region.trim();
    if region.is_empty() {
        return Err(jeonse_common::Error::InvalidInput(
            "Region must not be empty".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let heatmap = sqlx::query("DELETE FROM heatmap_data WHERE region = ?")
        .bind(region)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let search_history = sqlx::query("DELETE FROM search_history WHERE region = ?")
        .bind(region)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let transactions = sqlx::query(
        "DELETE FROM real_transactions WHERE region = ? OR instr(dong_name, ?) > 0",
    )
    .bind(region)
    .bind(region)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    let summary = PurgeSummary {
        heatmap,
        search_history,
        transactions,
    };
    info!(region = %region, ?summary, "Purged region data");
    Ok(summary)
}
