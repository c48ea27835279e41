use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    models::{AttendanceRecord, AttendanceStatus, ProductLine, SalesRecord},
    sources::{AttendanceSource, SalesSource},
    ApiResponse, AppState,
};

/// Build the record-capture Router scoped under `/api/v1`.
pub fn records_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attendance",
            post(record_attendance).get(list_attendance),
        )
        .route("/sales", post(record_sale).get(list_sales))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordWindowQuery {
    /// Inclusive lower bound (UTC)
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound (UTC)
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "employee_id": "emp-042",
    "store_id": "store-bkk-01",
    "status": "check-in"
}))]
pub struct RecordAttendanceRequest {
    /// Employee identifier
    #[validate(length(min = 1))]
    pub employee_id: String,
    /// Store identifier
    #[validate(length(min = 1))]
    pub store_id: String,
    /// Check-in or check-out
    pub status: AttendanceStatus,
    /// Capture instant; defaults to the server clock when omitted
    pub timestamp: Option<DateTime<Utc>>,
}

/// Capture an attendance event
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = RecordAttendanceRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = ApiResponse<AttendanceRecord>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn record_attendance(
    State(state): State<AppState>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<Json<ApiResponse<AttendanceRecord>>, ServiceError> {
    payload.validate()?;

    let record = AttendanceRecord {
        id: Uuid::new_v4(),
        employee_id: payload.employee_id,
        store_id: payload.store_id,
        timestamp: payload.timestamp.unwrap_or_else(Utc::now),
        status: payload.status,
    };
    info!(
        employee_id = %record.employee_id,
        store_id = %record.store_id,
        status = record.status.as_str(),
        "attendance recorded"
    );
    state.records.push_attendance(record.clone()).await;
    Ok(Json(ApiResponse::success(record)))
}

/// List captured attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(RecordWindowQuery),
    responses(
        (status = 200, description = "Attendance records", body = ApiResponse<Vec<AttendanceRecord>>)
    ),
    tag = "Records"
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    Query(window): Query<RecordWindowQuery>,
) -> Result<Json<ApiResponse<Vec<AttendanceRecord>>>, ServiceError> {
    let records =
        AttendanceSource::fetch(state.records.as_ref(), window.from, window.to).await?;
    Ok(Json(ApiResponse::success(records)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductLineRequest {
    /// Product identifier
    #[validate(length(min = 1))]
    pub product_id: String,
    /// Product display name
    #[validate(length(min = 1))]
    pub name: String,
    /// Units sold
    #[validate(range(min = 1))]
    pub quantity: i64,
    /// Line total amount
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "employee_id": "emp-042",
    "store_id": "store-bkk-01",
    "status": "completed",
    "product_lines": [
        { "product_id": "sku-1001", "name": "Iced Latte 16oz", "quantity": 2, "amount": "130.00" }
    ]
}))]
pub struct RecordSaleRequest {
    /// Employee entering the sale
    #[validate(length(min = 1))]
    pub employee_id: String,
    /// Store the sale belongs to
    #[validate(length(min = 1))]
    pub store_id: String,
    /// Workflow status label; defaults to "completed"
    pub status: Option<String>,
    /// Sale instant; defaults to the server clock when omitted
    pub timestamp: Option<DateTime<Utc>>,
    /// Product breakdown; must not be empty
    #[validate]
    pub product_lines: Vec<ProductLineRequest>,
}

/// Capture a sales entry
///
/// Total amount and quantity are derived from the product lines.
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = RecordSaleRequest,
    responses(
        (status = 200, description = "Sale recorded", body = ApiResponse<SalesRecord>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn record_sale(
    State(state): State<AppState>,
    Json(payload): Json<RecordSaleRequest>,
) -> Result<Json<ApiResponse<SalesRecord>>, ServiceError> {
    payload.validate()?;
    if payload.product_lines.is_empty() {
        return Err(ServiceError::ValidationError(
            "product_lines must not be empty".to_string(),
        ));
    }

    let product_lines: Vec<ProductLine> = payload
        .product_lines
        .into_iter()
        .map(|line| ProductLine {
            product_id: line.product_id,
            name: line.name,
            quantity: line.quantity,
            amount: line.amount,
        })
        .collect();

    let record = SalesRecord {
        id: Uuid::new_v4(),
        employee_id: payload.employee_id,
        store_id: payload.store_id,
        timestamp: payload.timestamp.unwrap_or_else(Utc::now),
        status: payload
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "completed".to_string()),
        total_amount: product_lines.iter().map(|l| l.amount).sum(),
        quantity: product_lines.iter().map(|l| l.quantity).sum(),
        product_lines,
    };
    info!(
        employee_id = %record.employee_id,
        store_id = %record.store_id,
        total_amount = %record.total_amount,
        "sale recorded"
    );
    state.records.push_sale(record.clone()).await;
    Ok(Json(ApiResponse::success(record)))
}

/// List captured sales records
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(RecordWindowQuery),
    responses(
        (status = 200, description = "Sales records", body = ApiResponse<Vec<SalesRecord>>)
    ),
    tag = "Records"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(window): Query<RecordWindowQuery>,
) -> Result<Json<ApiResponse<Vec<SalesRecord>>>, ServiceError> {
    let records = SalesSource::fetch(state.records.as_ref(), window.from, window.to).await?;
    Ok(Json(ApiResponse::success(records)))
}
