//! Public notifications derived from heatmap scores and cache activity

use chrono::Duration;
use jeonse_common::time::now;
use jeonse_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::heatmap::HeatmapRepository;
use crate::db::notifications::{
    count_since, exists_since, insert_notification, latest, recently_cached_regions, Notification,
};

/// Heatmap score at or above which a region gets a danger notice
const DANGER_SCORE: i64 = 80;
/// Most notices of each kind per refresh
const MAX_PER_KIND: i64 = 3;

/// A notice before it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftNotification {
    pub title: String,
    pub message: String,
    pub kind: &'static str,
}

pub struct NotificationService {
    pool: SqlitePool,
    heatmap: Arc<dyn HeatmapRepository>,
}

impl NotificationService {
    pub fn new(pool: SqlitePool, heatmap: Arc<dyn HeatmapRepository>) -> Self {
        Self { pool, heatmap }
    }

    /// Notices for current conditions, without storing them
    pub async fn drafts(&self) -> Result<Vec<DraftNotification>> {
        let mut drafts = Vec::new();

        for entry in self.heatmap.at_least(DANGER_SCORE, MAX_PER_KIND).await? {
            drafts.push(DraftNotification {
                title: "🚨 위험지역 경고".to_string(),
                message: format!(
                    "{}의 전세사기 위험도가 {}점으로 높습니다. 계약 시 주의하세요.",
                    entry.region, entry.score
                ),
                kind: "danger",
            });
        }

        let day_ago = now() - Duration::days(1);
        for (region, count) in recently_cached_regions(&self.pool, &day_ago, MAX_PER_KIND).await? {
            drafts.push(DraftNotification {
                title: "🏠 새로운 매물 등록".to_string(),
                message: format!("{}에 새로운 매물 {}건이 등록되었습니다.", region, count),
                kind: "info",
            });
        }

        Ok(drafts)
    }

    /// Store fresh notices unless some were created within the last hour
    ///
    /// Returns the number stored. A notice identical to one from the last
    /// day is skipped.
    pub async fn refresh(&self) -> Result<usize> {
        let current = now();
        if count_since(&self.pool, &(current - Duration::hours(1))).await? > 0 {
            debug!("Notifications refreshed within the last hour, skipping");
            return Ok(0);
        }

        let day_ago = current - Duration::days(1);
        let mut stored = 0;
        for draft in self.drafts().await? {
            if exists_since(&self.pool, &draft.title, &draft.message, &day_ago).await? {
                continue;
            }
            insert_notification(&self.pool, &draft.title, &draft.message, draft.kind, &current)
                .await?;
            stored += 1;
        }

        if stored > 0 {
            info!(stored, "Stored new notifications");
        }
        Ok(stored)
    }

    pub async fn latest(&self, limit: i64) -> Result<Vec<Notification>> {
        latest(&self.pool, limit.clamp(1, 100)).await
    }
}
