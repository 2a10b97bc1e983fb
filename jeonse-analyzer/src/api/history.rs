//! Search history and notification endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::notifications::Notification;
use crate::db::search_history::SearchRecord;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<SearchRecord>,
}

/// GET /api/search-history
pub async fn search_history(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let history = state.history.recent(query.limit.unwrap_or(10)).await?;
    Ok(Json(HistoryResponse { history }))
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// GET /api/notifications
///
/// Derives fresh notices first; a failure there still returns stored ones.
pub async fn notifications(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<NotificationsResponse>> {
    if let Err(e) = state.notifications.refresh().await {
        warn!(error = %e, "Notification refresh failed");
    }
    let notifications = state.notifications.latest(query.limit.unwrap_or(20)).await?;
    Ok(Json(NotificationsResponse { notifications }))
}

/// Build history routes
pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search-history", get(search_history))
        .route("/api/notifications", get(notifications))
}
