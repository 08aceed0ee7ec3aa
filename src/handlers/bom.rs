use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::BomStatus,
    services::billofmaterials::{
        CreateBomInput, CreateLineItemInput, UpdateBomInput, UpdateLineItemInput,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for BOM endpoints
pub fn bom_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_bom))
        .route("/", get(list_boms))
        .route("/cost-preview", post(cost_preview))
        .route("/:id", get(get_bom))
        .route("/:id", put(update_bom))
        .route("/:id/lines", get(get_line_items))
        .route("/:id/lines", post(add_line_item))
        .route("/:id/lines/:index", put(update_line_item))
        .route("/:id/lines/:index", delete(remove_line_item))
}

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBOMRequest {
    pub bom_code: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    #[validate(length(min = 1, max = 64))]
    pub version: String,
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "item_type")]
pub enum LineItemRequest {
    #[serde(rename = "rawMaterial")]
    RawMaterial {
        material_code: String,
        quantity: Decimal,
        unit_of_measure: Option<String>,
    },
    #[serde(rename = "bom")]
    Recipe { bom_code: String, quantity: Decimal },
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBOMRequest {
    #[validate(length(min = 1, max = 255))]
    pub product_name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub version: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLineItemRequest {
    pub quantity: Option<Decimal>,
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CostPreviewRequest {
    #[validate(length(min = 1, max = 64))]
    pub material_code: String,
    pub unit_of_measure: Option<String>,
    pub quantity: Decimal,
}

// Flattening PaginationParams here would break number parsing in
// serde_urlencoded, so the fields are inlined.
#[derive(Debug, Deserialize, Serialize)]
pub struct ListBomsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

fn parse_status(raw: &str) -> Result<BomStatus, ApiError> {
    BomStatus::from_str(raw)
        .map_err(|_| ApiError::BadRequest(format!("Unknown BOM status: {}", raw)))
}

// Handler functions

/// Create a new BOM with its line items
async fn create_bom(
    State(state): State<AppState>,
    Json(payload): Json<CreateBOMRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status = payload.status.as_deref().map(parse_status).transpose()?;

    let items = payload
        .items
        .into_iter()
        .map(|item| match item {
            LineItemRequest::RawMaterial {
                material_code,
                quantity,
                unit_of_measure,
            } => CreateLineItemInput::RawMaterial {
                material_code,
                quantity,
                unit_of_measure,
            },
            LineItemRequest::Recipe { bom_code, quantity } => {
                CreateLineItemInput::Recipe { bom_code, quantity }
            }
        })
        .collect();

    let input = CreateBomInput {
        bom_code: payload.bom_code,
        product_name: payload.product_name,
        version: payload.version,
        status,
        items,
    };

    let bom_id = state
        .services
        .bill_of_materials
        .create_bom(input)
        .await
        .map_err(map_service_error)?;

    info!("BOM created: {}", bom_id);

    Ok(created_response(serde_json::json!({
        "id": bom_id,
        "message": "BOM created successfully"
    })))
}

/// Get a BOM by ID
async fn get_bom(
    State(state): State<AppState>,
    Path(bom_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    match state.services.bill_of_materials.get_bom(&bom_id) {
        Some(bom) => Ok(success_response(bom)),
        None => Err(ApiError::NotFound(format!(
            "BOM with ID {} not found",
            bom_id
        ))),
    }
}

/// Update a BOM's fields
async fn update_bom(
    State(state): State<AppState>,
    Path(bom_id): Path<Uuid>,
    Json(payload): Json<UpdateBOMRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status = payload.status.as_deref().map(parse_status).transpose()?;

    let input = UpdateBomInput {
        product_name: payload.product_name,
        version: payload.version,
        status,
    };

    state
        .services
        .bill_of_materials
        .update_bom(bom_id, input)
        .await
        .map_err(map_service_error)?;

    info!("BOM updated: {}", bom_id);

    Ok(success_response(serde_json::json!({
        "message": "BOM updated successfully"
    })))
}

/// List all BOMs with pagination, optionally filtered by status
async fn list_boms(
    State(state): State<AppState>,
    Query(params): Query<ListBomsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);
    let status = params.status.as_deref().map(parse_status).transpose()?;

    let (boms, total) = state
        .services
        .bill_of_materials
        .list_boms(page, per_page, status);

    Ok(success_response(PaginatedResponse::new(
        boms, page, per_page, total,
    )))
}

/// Get line items for a BOM
async fn get_line_items(
    State(state): State<AppState>,
    Path(bom_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .bill_of_materials
        .get_line_items(&bom_id)
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Add a line item to a BOM
async fn add_line_item(
    State(state): State<AppState>,
    Path(bom_id): Path<Uuid>,
    Json(payload): Json<LineItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = match payload {
        LineItemRequest::RawMaterial {
            material_code,
            quantity,
            unit_of_measure,
        } => CreateLineItemInput::RawMaterial {
            material_code,
            quantity,
            unit_of_measure,
        },
        LineItemRequest::Recipe { bom_code, quantity } => {
            CreateLineItemInput::Recipe { bom_code, quantity }
        }
    };

    let index = state
        .services
        .bill_of_materials
        .add_line_item(&bom_id, input)
        .await
        .map_err(map_service_error)?;

    info!("Line item {} added to BOM {}", index, bom_id);

    Ok(created_response(serde_json::json!({
        "index": index,
        "message": "Line item added successfully"
    })))
}

/// Update one line item in place
async fn update_line_item(
    State(state): State<AppState>,
    Path((bom_id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<UpdateLineItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = UpdateLineItemInput {
        quantity: payload.quantity,
        unit_of_measure: payload.unit_of_measure,
    };

    state
        .services
        .bill_of_materials
        .update_line_item(&bom_id, index, input)
        .await
        .map_err(map_service_error)?;

    info!("Line item {} updated on BOM {}", index, bom_id);

    Ok(success_response(serde_json::json!({
        "message": "Line item updated successfully"
    })))
}

/// Remove a line item from a BOM
async fn remove_line_item(
    State(state): State<AppState>,
    Path((bom_id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .bill_of_materials
        .remove_line_item(&bom_id, index)
        .await
        .map_err(map_service_error)?;

    info!("Line item {} removed from BOM {}", index, bom_id);

    Ok(no_content_response())
}

/// Resolve cost for a material and unit without persisting anything
async fn cost_preview(
    State(state): State<AppState>,
    Json(payload): Json<CostPreviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let preview = state.services.bill_of_materials.cost_preview(
        &payload.material_code,
        payload.unit_of_measure.as_deref(),
        payload.quantity,
    );

    Ok(success_response(preview))
}
