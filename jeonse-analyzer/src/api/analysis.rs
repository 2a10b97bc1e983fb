//! Region analysis endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::models::{AdministrativeCode, MatchedProperty, Period, RiskLevel, SaleTransaction};
use crate::services::PropertyFilter;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub region: String,
    /// District code that was queried
    pub lawd_cd: String,
    pub neighborhood: String,
    /// True when the region was not recognised and the default district was used
    pub fallback: bool,
    pub properties: Vec<MatchedProperty>,
}

/// GET /analyze?region=
pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let region = query.region.trim();
    if region.is_empty() {
        return Err(ApiError::BadRequest("지역명을 입력하세요".to_string()));
    }

    let analysis = state.orchestrator.analyze(region).await?;

    if let Err(e) = state.history.record(&analysis).await {
        warn!(region = %region, error = %e, "Failed to record search history");
    }

    Ok(Json(AnalyzeResponse {
        region: region.to_string(),
        lawd_cd: analysis.code.to_string(),
        neighborhood: analysis.resolution.neighborhood.clone(),
        fallback: analysis.resolution.was_fallback(),
        properties: analysis.properties,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdvancedSearchQuery {
    #[serde(default)]
    pub region: String,
    /// 억
    pub min_price: Option<f64>,
    /// 억
    pub max_price: Option<f64>,
    pub property_type: Option<String>,
    pub risk_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertiesResponse {
    pub properties: Vec<MatchedProperty>,
}

/// GET /api/advanced-search
pub async fn advanced_search(
    State(state): State<AppState>,
    Query(query): Query<AdvancedSearchQuery>,
) -> ApiResult<Json<PropertiesResponse>> {
    let risk_level = match query.risk_level.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(level) => Some(level.parse::<RiskLevel>().map_err(ApiError::BadRequest)?),
    };
    let filter = PropertyFilter {
        min_price_eok: query.min_price,
        max_price_eok: query.max_price,
        property_type: query.property_type.filter(|t| !t.trim().is_empty()),
        risk_level,
    };

    let properties = state.orchestrator.fetch_properties(&query.region).await?;
    let properties = if filter.is_empty() {
        properties
    } else {
        filter.apply(properties)
    };
    Ok(Json(PropertiesResponse { properties }))
}

#[derive(Debug, Deserialize)]
pub struct RealTransactionsQuery {
    #[serde(default)]
    pub region: String,
    pub lawd_cd: Option<String>,
    pub deal_ymd: Option<String>,
    #[serde(rename = "pageNo")]
    pub page_no: Option<u32>,
    #[serde(rename = "numOfRows")]
    pub num_of_rows: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<SaleTransaction>,
}

/// GET /api/real-transactions
pub async fn real_transactions(
    State(state): State<AppState>,
    Query(query): Query<RealTransactionsQuery>,
) -> ApiResult<Json<TransactionsResponse>> {
    let code = query
        .lawd_cd
        .filter(|c| !c.trim().is_empty())
        .map(|c| AdministrativeCode::new(c.trim()));
    let period = match query.deal_ymd.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            Period::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("deal_ymd must be YYYYMM: {}", raw)))?,
        ),
    };

    let transactions = state
        .orchestrator
        .real_transactions(
            &query.region,
            code,
            period,
            query.page_no.unwrap_or(1),
            query.num_of_rows.unwrap_or(30),
        )
        .await?;

    Ok(Json(TransactionsResponse { transactions }))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", get(analyze))
        .route("/api/advanced-search", get(advanced_search))
        .route("/api/real-transactions", get(real_transactions))
}
