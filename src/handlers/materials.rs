use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    events::Event,
    handlers::AppState,
    models::RawMaterial,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

/// Creates the router for raw material catalog endpoints
pub fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upsert_material))
        .route("/", get(list_materials))
        .route("/import", post(import_materials))
        .route("/:code_or_id", get(get_material))
}

// Request DTOs

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct MaterialRequest {
    #[validate(length(min = 1, max = 64))]
    pub material_code: String,
    #[validate(length(min = 1, max = 255))]
    pub material_name: String,
    #[validate(length(min = 1, max = 64))]
    pub unit_of_measure: String,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImportMaterialsRequest {
    #[validate(length(min = 1))]
    pub materials: Vec<MaterialRequest>,
}

// Handler functions

/// Create or replace a single raw material
async fn upsert_material(
    State(state): State<AppState>,
    Json(payload): Json<MaterialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let material = RawMaterial::new(
        payload.material_code.clone(),
        payload.material_name,
        payload.unit_of_measure,
        payload.unit_price,
    );

    state
        .services
        .materials
        .upsert(material)
        .map_err(map_service_error)?;

    state
        .event_sender
        .send_or_log(Event::MaterialUpserted {
            material_code: payload.material_code.clone(),
        })
        .await;

    info!("Raw material upserted: {}", payload.material_code);

    Ok(created_response(serde_json::json!({
        "material_code": payload.material_code,
        "message": "Raw material saved successfully"
    })))
}

/// Bulk-import raw materials into the catalog
async fn import_materials(
    State(state): State<AppState>,
    Json(payload): Json<ImportMaterialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    // Each entry is held to the same limits as a single upsert.
    for material in &payload.materials {
        validate_input(material)?;
    }

    let materials = payload
        .materials
        .into_iter()
        .map(|m| RawMaterial::new(m.material_code, m.material_name, m.unit_of_measure, m.unit_price))
        .collect();

    let (imported, skipped) = state.services.materials.import(materials);

    state
        .event_sender
        .send_or_log(Event::MaterialsImported { imported, skipped })
        .await;

    info!("Raw materials imported: {} ({} skipped)", imported, skipped);

    Ok(success_response(serde_json::json!({
        "imported": imported,
        "skipped": skipped
    })))
}

/// List catalog materials with pagination
async fn list_materials(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let (materials, total) = state.services.materials.list(page, per_page);

    Ok(success_response(PaginatedResponse::new(
        materials, page, per_page, total,
    )))
}

/// Get one material by code or UUID
async fn get_material(
    State(state): State<AppState>,
    Path(code_or_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.services.materials.find(&code_or_id) {
        Some(material) => Ok(success_response(material)),
        None => Err(ApiError::NotFound(format!(
            "Raw material {} not found",
            code_or_id
        ))),
    }
}
