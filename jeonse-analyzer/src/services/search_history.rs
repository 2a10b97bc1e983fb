//! Recording analysed regions

use std::sync::Arc;

use jeonse_common::Result;
use sqlx::SqlitePool;
use tracing::warn;

use super::retrieval_orchestrator::Analysis;
use crate::db::heatmap::HeatmapRepository;
use crate::db::search_history::{insert_search, recent_searches, SearchRecord};

pub struct SearchHistoryService {
    pool: SqlitePool,
    heatmap: Arc<dyn HeatmapRepository>,
}

impl SearchHistoryService {
    pub fn new(pool: SqlitePool, heatmap: Arc<dyn HeatmapRepository>) -> Self {
        Self { pool, heatmap }
    }

    /// Score shown next to a search: the heatmap score when the
    /// neighbourhood has one, else the rounded average jeonse rate
    pub async fn score_for(&self, analysis: &Analysis) -> Option<i64> {
        match self.heatmap.score_of(&analysis.resolution.neighborhood).await {
            Ok(Some(score)) => return Some(score),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Heatmap lookup failed for search history"),
        }
        analysis.average_rate().map(|rate| rate.round() as i64)
    }

    /// Store one search keyed by its neighbourhood
    pub async fn record(&self, analysis: &Analysis) -> Result<i64> {
        let score = self.score_for(analysis).await;
        insert_search(&self.pool, &analysis.resolution.neighborhood, score).await
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<SearchRecord>> {
        recent_searches(&self.pool, limit.clamp(1, 100)).await
    }
}
