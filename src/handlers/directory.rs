use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    errors::ServiceError,
    models::{Employee, Store},
    sources::DirectorySource,
    ApiResponse, AppState,
};

/// Build the directory Router scoped under `/api/v1`.
pub fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list_stores))
        .route("/stores/:id", put(upsert_store))
        .route("/employees", get(list_employees))
        .route("/employees/:id", put(upsert_employee))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Sukhumvit Flagship",
    "province": "Bangkok",
    "latitude": 13.7367,
    "longitude": 100.5608
}))]
pub struct UpsertStoreRequest {
    /// Display name
    #[validate(length(min = 1))]
    pub name: String,
    /// Province the store operates in
    pub province: Option<String>,
    /// Latitude of the storefront
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    /// Longitude of the storefront
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Create or replace a store directory entry
#[utoipa::path(
    put,
    path = "/api/v1/stores/{id}",
    params(("id" = String, Path, description = "Store identifier")),
    request_body = UpsertStoreRequest,
    responses(
        (status = 200, description = "Store upserted", body = ApiResponse<Store>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Directory"
)]
pub async fn upsert_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpsertStoreRequest>,
) -> Result<Json<ApiResponse<Store>>, ServiceError> {
    payload.validate()?;

    let store = Store {
        id,
        name: payload.name,
        province: payload.province,
        latitude: payload.latitude,
        longitude: payload.longitude,
    };
    info!(store_id = %store.id, "store directory entry upserted");
    state.records.upsert_store(store.clone()).await;
    Ok(Json(ApiResponse::success(store)))
}

/// List store directory entries
#[utoipa::path(
    get,
    path = "/api/v1/stores",
    responses(
        (status = 200, description = "Stores", body = ApiResponse<Vec<Store>>)
    ),
    tag = "Directory"
)]
pub async fn list_stores(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Store>>>, ServiceError> {
    let mut stores = DirectorySource::stores(state.records.as_ref()).await?;
    stores.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(ApiResponse::success(stores)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "name": "Nok S.", "province": "Bangkok" }))]
pub struct UpsertEmployeeRequest {
    /// Display name
    #[validate(length(min = 1))]
    pub name: String,
    /// Home province
    pub province: Option<String>,
}

/// Create or replace an employee directory entry
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = String, Path, description = "Employee identifier")),
    request_body = UpsertEmployeeRequest,
    responses(
        (status = 200, description = "Employee upserted", body = ApiResponse<Employee>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Directory"
)]
pub async fn upsert_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpsertEmployeeRequest>,
) -> Result<Json<ApiResponse<Employee>>, ServiceError> {
    payload.validate()?;

    let employee = Employee {
        id,
        name: payload.name,
        province: payload.province,
    };
    info!(employee_id = %employee.id, "employee directory entry upserted");
    state.records.upsert_employee(employee.clone()).await;
    Ok(Json(ApiResponse::success(employee)))
}

/// List employee directory entries
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "Employees", body = ApiResponse<Vec<Employee>>)
    ),
    tag = "Directory"
)]
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Employee>>>, ServiceError> {
    let mut employees = DirectorySource::employees(state.records.as_ref()).await?;
    employees.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(ApiResponse::success(employees)))
}
