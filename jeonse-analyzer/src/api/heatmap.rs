//! Heatmap endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{HeatmapEntry, RegionPoint};
use crate::AppState;

/// GET /heatmap
pub async fn get_heatmap(State(state): State<AppState>) -> ApiResult<Json<Vec<HeatmapEntry>>> {
    Ok(Json(state.heatmap.get_heatmap(false).await?))
}

#[derive(Debug, Serialize)]
pub struct HeatmapUpdateResponse {
    pub success: bool,
    pub data: Vec<HeatmapEntry>,
    pub message: String,
}

/// POST /api/heatmap/refresh
pub async fn refresh_heatmap(State(state): State<AppState>) -> ApiResult<Json<HeatmapUpdateResponse>> {
    let data = state.heatmap.refresh().await?;
    Ok(Json(HeatmapUpdateResponse {
        success: true,
        message: format!("{}개 지역 데이터가 최신 전세가율로 업데이트되었습니다.", data.len()),
        data,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegionUpdate {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

/// POST /api/heatmap/update
pub async fn update_heatmap(
    State(state): State<AppState>,
    Json(body): Json<Vec<RegionUpdate>>,
) -> ApiResult<Json<HeatmapUpdateResponse>> {
    let points: Vec<RegionPoint> = body
        .into_iter()
        .filter(|u| !u.region.trim().is_empty())
        .map(|u| RegionPoint {
            region: u.region.trim().to_string(),
            lat: u.lat,
            lng: u.lng,
        })
        .collect();
    if points.is_empty() {
        return Err(ApiError::BadRequest("No regions to update".to_string()));
    }

    let data = state.heatmap.update_regions(points).await?;
    Ok(Json(HeatmapUpdateResponse {
        success: true,
        message: format!("{}개 지역 데이터가 전세가율 기반으로 업데이트되었습니다.", data.len()),
        data,
    }))
}

/// Build heatmap routes
pub fn heatmap_routes() -> Router<AppState> {
    Router::new()
        .route("/heatmap", get(get_heatmap))
        .route("/api/heatmap/refresh", post(refresh_heatmap))
        .route("/api/heatmap/update", post(update_heatmap))
}
