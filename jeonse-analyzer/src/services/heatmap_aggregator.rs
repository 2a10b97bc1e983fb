//! Neighbourhood risk heatmap
//!
//! The heatmap always lists the fixed catalogue. Scores only change through
//! an explicit refresh or update; reading the heatmap never triggers
//! registry traffic.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use jeonse_common::time::now;
use jeonse_common::Result;
use tracing::{info, warn};

use super::retrieval_orchestrator::{average_positive_rate, RetrievalOrchestrator};
use crate::db::heatmap::HeatmapRepository;
use crate::models::{catalogue_points, HeatmapEntry, RegionPoint};

/// Regions analysed at once during a refresh
const REFRESH_CONCURRENCY: usize = 2;

/// Heatmap score for an average jeonse rate
pub fn score_for_rate(rate: Option<f64>) -> i64 {
    rate.map(|r| (r.round() as i64).clamp(0, 100)).unwrap_or(0)
}

pub struct HeatmapAggregator {
    repository: Arc<dyn HeatmapRepository>,
    orchestrator: Arc<RetrievalOrchestrator>,
}

impl HeatmapAggregator {
    pub fn new(
        repository: Arc<dyn HeatmapRepository>,
        orchestrator: Arc<RetrievalOrchestrator>,
    ) -> Self {
        Self {
            repository,
            orchestrator,
        }
    }

    /// Catalogue merged with persisted scores, then persisted back
    ///
    /// With `force_update` persisted scores are ignored and every entry is
    /// reset to 0.
    pub async fn get_heatmap(&self, force_update: bool) -> Result<Vec<HeatmapEntry>> {
        let persisted: HashMap<String, HeatmapEntry> = if force_update {
            HashMap::new()
        } else {
            match self.repository.load_all().await {
                Ok(entries) => entries.into_iter().map(|e| (e.region.clone(), e)).collect(),
                Err(e) => {
                    warn!(error = %e, "Heatmap load failed, using catalogue defaults");
                    HashMap::new()
                }
            }
        };

        let timestamp = now();
        let entries: Vec<HeatmapEntry> = catalogue_points()
            .into_iter()
            .map(|point| match persisted.get(&point.region) {
                Some(existing) => HeatmapEntry {
                    updated_at: Some(timestamp),
                    ..existing.clone()
                },
                None => HeatmapEntry {
                    region: point.region,
                    score: 0,
                    lat: point.lat,
                    lng: point.lng,
                    updated_at: Some(timestamp),
                },
            })
            .collect();

        self.repository.upsert(&entries).await?;
        Ok(entries)
    }

    /// Recompute every catalogue region from live analysis
    pub async fn refresh(&self) -> Result<Vec<HeatmapEntry>> {
        let entries = self.update_regions(catalogue_points()).await?;
        info!(regions = entries.len(), "Heatmap refreshed");
        Ok(entries)
    }

    /// Analyse the given regions and persist their scores
    pub async fn update_regions(&self, points: Vec<RegionPoint>) -> Result<Vec<HeatmapEntry>> {
        let points: Vec<RegionPoint> = points
            .into_iter()
            .filter(|p| !p.region.trim().is_empty())
            .collect();

        let entries: Vec<HeatmapEntry> = stream::iter(points)
            .map(|point| async move {
                let score = match self.orchestrator.fetch_properties(&point.region).await {
                    Ok(properties) => score_for_rate(average_positive_rate(&properties)),
                    Err(e) => {
                        warn!(region = %point.region, error = %e, "Heatmap analysis failed");
                        0
                    }
                };
                HeatmapEntry {
                    region: point.region,
                    score,
                    lat: point.lat,
                    lng: point.lng,
                    updated_at: Some(now()),
                }
            })
            .buffered(REFRESH_CONCURRENCY)
            .collect()
            .await;

        self.repository.upsert(&entries).await?;
        Ok(entries)
    }
}
