//! HTTP integration tests for the v1 API.
//!
//! Tests cover:
//! - Material import and lookup
//! - Recipe creation and retrieval with server-computed costs
//! - Line item endpoints
//! - Cost preview
//! - Error responses

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use recipecost_api::{self as api, config::AppConfig, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

fn build_app() -> Router {
    let (event_tx, event_rx) = mpsc::channel(64);
    let event_sender = Arc::new(api::events::EventSender::new(event_tx));
    tokio::spawn(api::events::process_events(event_rx));

    let config = AppConfig::default();
    let services = api::handlers::AppServices::new(config.catalog_capacity, event_sender.clone());
    let state = AppState {
        config,
        event_sender,
        services,
    };

    Router::new()
        .nest("/api/v1", api::api_v1_routes())
        .with_state(state)
}

async fn request(app: &Router, method: Method, uri: &str, payload: Option<Value>) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match payload {
        Some(value) => builder
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    app.clone().oneshot(request).await.expect("response")
}

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

async fn seed_materials(app: &Router) {
    // Pricing units are the free-text base tokens recorded on the material
    // master, not the canonical recipe labels.
    let payload = json!({
        "materials": [
            {"material_code": "FLOUR", "material_name": "Wheat Flour", "unit_of_measure": "kg", "unit_price": "5.00"},
            {"material_code": "OIL", "material_name": "Sunflower Oil", "unit_of_measure": "ltr", "unit_price": "3.00"},
            {"material_code": "EGG", "material_name": "Eggs", "unit_of_measure": "pcs", "unit_price": "0.50"}
        ]
    });
    let response = request(app, Method::POST, "/api/v1/raw-materials/import", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn import_reports_counts_and_materials_are_retrievable() {
    let app = build_app();
    seed_materials(&app).await;

    let response = request(&app, Method::GET, "/api/v1/raw-materials/FLOUR", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["material_name"], "Wheat Flour");
    assert_eq!(body["unit_price"], "5.00");

    let response = request(&app, Method::GET, "/api/v1/raw-materials/NOPE", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = request(&app, Method::GET, "/api/v1/raw-materials?page=1&per_page=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn import_rejects_entries_a_single_upsert_would_reject() {
    let app = build_app();

    let payload = json!({
        "materials": [
            {"material_code": "", "material_name": "Nameless", "unit_of_measure": "kg", "unit_price": "1.00"}
        ]
    });
    let response = request(&app, Method::POST, "/api/v1/raw-materials/import", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request(&app, Method::GET, "/api/v1/raw-materials?page=1&per_page=10", None).await;
    let body = response_json(response).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn create_bom_returns_id_and_computes_costs() {
    let app = build_app();
    seed_materials(&app).await;

    let payload = json!({
        "bom_code": "DOUGH",
        "product_name": "Pizza Dough",
        "version": "1",
        "items": [
            {"item_type": "rawMaterial", "material_code": "FLOUR", "quantity": "2.5"},
            {"item_type": "rawMaterial", "material_code": "EGG", "quantity": "2"}
        ]
    });
    let response = request(&app, Method::POST, "/api/v1/bill-of-materials", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let bom_id = body["id"].as_str().expect("bom id").to_string();

    let response = request(
        &app,
        Method::GET,
        &format!("/api/v1/bill-of-materials/{}", bom_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bom = response_json(response).await;
    assert_eq!(bom["bom_code"], "DOUGH");
    assert_eq!(bom["status"], "Draft");
    assert_eq!(bom["total_cost"], "13.50");
    assert_eq!(bom["items"][0]["total_cost"], "12.50");
    assert_eq!(bom["items"][0]["item_type"], "rawMaterial");
}

#[tokio::test]
async fn nested_recipe_lines_price_from_referenced_total() {
    let app = build_app();
    seed_materials(&app).await;

    let sauce = json!({
        "bom_code": "SAUCE",
        "product_name": "Base Sauce",
        "version": "1",
        "items": [
            {"item_type": "rawMaterial", "material_code": "FLOUR", "quantity": "2.5"}
        ]
    });
    let response = request(&app, Method::POST, "/api/v1/bill-of-materials", Some(sauce)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let parent = json!({
        "bom_code": "PASTA",
        "product_name": "Pasta Plate",
        "version": "1",
        "items": [
            {"item_type": "bom", "bom_code": "SAUCE", "quantity": "2"}
        ]
    });
    let response = request(&app, Method::POST, "/api/v1/bill-of-materials", Some(parent)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let parent_id = body["id"].as_str().expect("bom id").to_string();

    let response = request(
        &app,
        Method::GET,
        &format!("/api/v1/bill-of-materials/{}/lines", parent_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let lines = response_json(response).await;
    assert_eq!(lines[0]["item_type"], "bom");
    assert_eq!(lines[0]["unit_of_measure"], "pcs");
    assert_eq!(lines[0]["unit_cost"], "12.50");
    assert_eq!(lines[0]["total_cost"], "25.00");
}

#[tokio::test]
async fn line_item_endpoints_mutate_and_recompute() {
    let app = build_app();
    seed_materials(&app).await;

    let payload = json!({
        "product_name": "Scramble",
        "version": "1",
        "items": [
            {"item_type": "rawMaterial", "material_code": "EGG", "quantity": "2"}
        ]
    });
    let response = request(&app, Method::POST, "/api/v1/bill-of-materials", Some(payload)).await;
    let bom_id = response_json(response).await["id"]
        .as_str()
        .expect("bom id")
        .to_string();

    let add = json!({"item_type": "rawMaterial", "material_code": "FLOUR", "quantity": "1"});
    let response = request(
        &app,
        Method::POST,
        &format!("/api/v1/bill-of-materials/{}/lines", bom_id),
        Some(add),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response_json(response).await["index"], 1);

    let update = json!({"quantity": "4"});
    let response = request(
        &app,
        Method::PUT,
        &format!("/api/v1/bill-of-materials/{}/lines/0", bom_id),
        Some(update),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        Method::DELETE,
        &format!("/api/v1/bill-of-materials/{}/lines/1", bom_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = request(
        &app,
        Method::GET,
        &format!("/api/v1/bill-of-materials/{}", bom_id),
        None,
    )
    .await;
    let bom = response_json(response).await;
    // 4 eggs at 0.50 after the flour line was removed.
    assert_eq!(bom["total_cost"], "2.00");

    // Out-of-range index is a client error.
    let response = request(
        &app,
        Method::DELETE,
        &format!("/api/v1/bill-of-materials/{}/lines/9", bom_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cost_preview_resolves_units() {
    let app = build_app();
    seed_materials(&app).await;

    let payload = json!({
        "material_code": "OIL",
        "unit_of_measure": "ml (Milli Litre)",
        "quantity": "500"
    });
    let response = request(
        &app,
        Method::POST,
        "/api/v1/bill-of-materials/cost-preview",
        Some(payload),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["material_found"], true);
    assert_eq!(body["unit_cost"], "0.003");
    assert_eq!(body["total_cost"], "1.50");
}

#[tokio::test]
async fn error_paths_return_structured_responses() {
    let app = build_app();

    // Unknown BOM id.
    let response = request(
        &app,
        Method::GET,
        &format!("/api/v1/bill-of-materials/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert!(body["message"].as_str().is_some());

    // Unknown status filter.
    let response = request(
        &app,
        Method::GET,
        "/api/v1/bill-of-materials?status=bogus",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Duplicate BOM code.
    let payload = json!({"bom_code": "DUP", "product_name": "First", "version": "1"});
    let response = request(&app, Method::POST, "/api/v1/bill-of-materials", Some(payload.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = request(&app, Method::POST, "/api/v1/bill-of-materials", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn status_and_health_endpoints_respond() {
    let app = build_app();

    let response = request(&app, Method::GET, "/api/v1/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "ok");

    let response = request(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "healthy");
}
