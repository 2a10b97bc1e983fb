//! jeonse-analyzer library interface
//!
//! Jeonse (lump-sum deposit lease) risk analysis over public real-estate
//! transaction records. Exposes the pipeline for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::{HeatmapRepository, SqliteHeatmapRepository};
use crate::services::{
    HeatmapAggregator, NotificationService, RetrievalOrchestrator, SearchHistoryService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub orchestrator: Arc<RetrievalOrchestrator>,
    pub heatmap: Arc<HeatmapAggregator>,
    pub history: Arc<SearchHistoryService>,
    pub notifications: Arc<NotificationService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, orchestrator: RetrievalOrchestrator) -> Self {
        let orchestrator = Arc::new(orchestrator);
        let heatmap_repo: Arc<dyn HeatmapRepository> =
            Arc::new(SqliteHeatmapRepository::new(db.clone()));

        Self {
            heatmap: Arc::new(HeatmapAggregator::new(
                heatmap_repo.clone(),
                orchestrator.clone(),
            )),
            history: Arc::new(SearchHistoryService::new(db.clone(), heatmap_repo.clone())),
            notifications: Arc::new(NotificationService::new(db.clone(), heatmap_repo)),
            orchestrator,
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::analysis_routes())
        .merge(api::heatmap_routes())
        .merge(api::history_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
