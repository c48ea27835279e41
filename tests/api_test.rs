use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use retailops_api::config::AppConfig;
use retailops_api::services::dashboard::{DashboardService, DashboardSettings, SystemClock};
use retailops_api::sources::memory::InMemoryRecordStore;
use retailops_api::{api_v1_routes, AppState};

fn app() -> Router {
    let config = AppConfig::default();
    let records = Arc::new(InMemoryRecordStore::new());
    let dashboard = DashboardService::new(
        records.clone(),
        records.clone(),
        records.clone(),
        Arc::new(SystemClock),
        DashboardSettings::from_config(&config),
    );
    api_v1_routes().with_state(AppState {
        config,
        dashboard,
        records,
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(payload) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn status_endpoint_reports_service_identity() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["service"], json!("retailops-api"));
}

#[tokio::test]
async fn attendance_round_trips_through_the_api() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/attendance",
        Some(json!({
            "employee_id": "emp-042",
            "store_id": "store-bkk-01",
            "status": "check-in"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("check-in"));

    let (status, body) = send(&app, Method::GET, "/attendance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sale_totals_are_derived_from_product_lines() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/sales",
        Some(json!({
            "employee_id": "emp-042",
            "store_id": "store-bkk-01",
            "product_lines": [
                { "product_id": "sku-1", "name": "Iced Latte", "quantity": 2, "amount": "130.00" },
                { "product_id": "sku-2", "name": "Croissant", "quantity": 1, "amount": "65.00" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"], json!("195.00"));
    assert_eq!(body["data"]["quantity"], json!(3));
    assert_eq!(body["data"]["status"], json!("completed"));
}

#[tokio::test]
async fn sale_without_product_lines_is_rejected() {
    let app = app();
    let (status, _body) = send(
        &app,
        Method::POST,
        "/sales",
        Some(json!({
            "employee_id": "emp-042",
            "store_id": "store-bkk-01",
            "product_lines": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_store_name_is_rejected() {
    let app = app();
    let (status, _body) = send(
        &app,
        Method::PUT,
        "/stores/store-bkk-01",
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_upsert_replaces_and_lists_sorted() {
    let app = app();
    for (id, name) in [("b-store", "Second"), ("a-store", "First"), ("b-store", "Renamed")] {
        let (status, _body) = send(
            &app,
            Method::PUT,
            &format!("/stores/{id}"),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, "/stores", None).await;
    assert_eq!(status, StatusCode::OK);
    let stores = body["data"].as_array().unwrap();
    assert_eq!(stores.len(), 2);
    assert_eq!(stores[0]["id"], json!("a-store"));
    assert_eq!(stores[1]["name"], json!("Renamed"));
}

#[tokio::test]
async fn metrics_endpoint_echoes_resolved_filters() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/dashboard/metrics?range_mode=day&range_value=2024-03-15&store=store-bkk-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["filters"]["range_mode"], json!("day"));
    assert_eq!(body["data"]["filters"]["range_value"], json!("2024-03-15"));
    assert_eq!(body["data"]["filters"]["time_zone"], json!("Asia/Bangkok"));
    assert_eq!(body["data"]["kpis"]["sales"]["value"], json!("0"));
    assert_eq!(body["data"]["timeline"], json!([]));
}

#[tokio::test]
async fn snapshot_endpoint_serves_empty_state() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/dashboard/snapshot", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totals"]["transactions"], json!(0));
    assert_eq!(body["data"]["top_products"], json!([]));
}

#[tokio::test]
async fn health_endpoint_counts_records() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/attendance",
        Some(json!({
            "employee_id": "emp-001",
            "store_id": "store-bkk-01",
            "status": "check-in"
        })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["attendance_records"], json!(1));
    assert_eq!(body["data"]["checks"]["sales_records"], json!(0));
}
