use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::{
    errors::ServiceError,
    services::dashboard::{DashboardFilters, Metrics, Snapshot},
    ApiResponse, AppState,
};

/// Build the dashboard Router scoped under `/api/v1/dashboard`.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/snapshot", get(get_snapshot))
        .route("/metrics", get(get_metrics))
}

/// Coarse first-paint overview: lifetime totals, default-period KPIs, recent
/// sales trend, top products
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/snapshot",
    responses(
        (status = 200, description = "Snapshot assembled successfully", body = ApiResponse<Snapshot>),
        (status = 502, description = "A record source was unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Snapshot>>, ServiceError> {
    let snapshot = state.dashboard.snapshot().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// Fully filter-driven metrics payload
///
/// Recomputed on every call; unusable filter values (bad range value, unknown
/// timezone) degrade to server defaults instead of failing, and the resolved
/// filter set is echoed back in the response.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/metrics",
    params(DashboardFilters),
    responses(
        (status = 200, description = "Metrics computed successfully", body = ApiResponse<Metrics>),
        (status = 502, description = "A record source was unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn get_metrics(
    State(state): State<AppState>,
    Query(filters): Query<DashboardFilters>,
) -> Result<Json<ApiResponse<Metrics>>, ServiceError> {
    let metrics = state.dashboard.metrics(filters).await?;
    Ok(Json(ApiResponse::success(metrics)))
}
