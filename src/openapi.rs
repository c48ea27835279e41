use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RetailOps API",
        version = "0.1.0",
        description = r#"
# RetailOps API

Backend for retail store operations: attendance check-in/out capture,
per-unit sales entry, directory administration, and a dashboard metrics
engine.

## Dashboard

- **Snapshot** (`/dashboard/snapshot`): coarse first-paint overview with
  lifetime totals, default-period KPIs, a recent sales trend, and top
  products.
- **Metrics** (`/dashboard/metrics`): fully filter-driven payload with a
  daily timeline, store/employee/status leaderboards, KPIs with
  period-over-period deltas, and threshold alerts. The resolved filter set
  is echoed back for UI/URL synchronization.

Percentage deltas compare the selected period against the immediately
preceding one; a metric without a previous-period baseline reports a delta
of 0 rather than infinity.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    paths(
        handlers::dashboard::get_snapshot,
        handlers::dashboard::get_metrics,
        handlers::records::record_attendance,
        handlers::records::list_attendance,
        handlers::records::record_sale,
        handlers::records::list_sales,
        handlers::directory::upsert_store,
        handlers::directory::list_stores,
        handlers::directory::upsert_employee,
        handlers::directory::list_employees,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::models::AttendanceRecord,
        crate::models::AttendanceStatus,
        crate::models::SalesRecord,
        crate::models::ProductLine,
        crate::models::Store,
        crate::models::Employee,
        crate::services::dashboard::DashboardFilters,
        crate::services::dashboard::RangeMode,
        crate::services::dashboard::Kpi,
        crate::services::dashboard::KpiSet,
        crate::services::dashboard::TimelineBucket,
        crate::services::dashboard::StoreSegment,
        crate::services::dashboard::EmployeeSegment,
        crate::services::dashboard::StatusSegment,
        crate::services::dashboard::PeriodSummary,
        crate::services::dashboard::Metrics,
        crate::services::dashboard::Snapshot,
        crate::services::dashboard::SnapshotTotals,
        crate::services::dashboard::TrendPoint,
        crate::services::dashboard::ProductRank,
    )),
    tags(
        (name = "Dashboard", description = "Snapshot and filter-driven metrics"),
        (name = "Records", description = "Attendance and sales capture"),
        (name = "Directory", description = "Store and employee administration")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
