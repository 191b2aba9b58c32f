//! Calculator API endpoints
//!
//! Handles HTTP requests for the calculator engine:
//! - POST /api/calculate - Run a calculator and record the run
//! - GET /api/admin/calculations - List recent calculator runs
//! - GET /api/admin/calculations/stats - Usage statistics

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Calculation, CalculationStats, ListParams};

/// Request body for running a calculator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    /// Calculator tool identifier, e.g. "laser-cutting"
    pub tool_type: String,
    /// Tool-specific parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response wrapping a calculator result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub tool_type: String,
    pub result: serde_json::Value,
}

/// Response for a recorded calculator run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub id: i64,
    pub tool_type: String,
    pub params: serde_json::Value,
    pub result: serde_json::Value,
    pub created_at: String,
}

impl From<Calculation> for CalculationResponse {
    fn from(calculation: Calculation) -> Self {
        Self {
            id: calculation.id,
            tool_type: calculation.tool_type,
            params: calculation.params,
            result: calculation.result,
            created_at: calculation.created_at.to_rfc3339(),
        }
    }
}

/// Response for calculation lists
#[derive(Debug, Serialize)]
pub struct CalculationListResponse {
    pub calculations: Vec<CalculationResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Query parameters for listing calculations
#[derive(Debug, Deserialize)]
pub struct ListCalculationsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Filter by tool identifier
    pub tool: Option<String>,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    20
}

/// Build the public calculate router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(calculate))
}

/// Build the admin calculations router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_calculations))
        .route("/stats", get(calculation_stats))
}

/// POST /api/calculate - Run a calculator and record the run
pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let result = state
        .calculation_service
        .run(&request.tool_type, request.params)
        .await?;

    Ok(Json(CalculateResponse {
        tool_type: request.tool_type,
        result,
    }))
}

/// GET /api/admin/calculations - List recent calculator runs
pub async fn list_calculations(
    State(state): State<AppState>,
    Query(query): Query<ListCalculationsQuery>,
) -> Result<Json<CalculationListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let result = state
        .calculation_service
        .recent(query.tool.as_deref(), &params)
        .await?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(CalculationListResponse {
        calculations: result.items.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /api/admin/calculations/stats - Usage statistics
pub async fn calculation_stats(
    State(state): State<AppState>,
) -> Result<Json<CalculationStats>, ApiError> {
    Ok(Json(state.calculation_service.stats().await?))
}
