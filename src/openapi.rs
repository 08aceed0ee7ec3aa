use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RecipeCost API",
        version = "1.0.0",
        description = r#"
# RecipeCost Kitchen BOM API

Recipe (bill-of-materials) authoring and costing for restaurant and
central-kitchen operations.

## Features

- **Raw Material Catalog**: Bulk import and maintain priced ingredients
- **Recipe Management**: Author recipes from raw materials and nested recipes
- **Cost Resolution**: Unit-aware ingredient cost resolution (kg/g, ltr/ml)
- **Cost Rollup**: Server-computed line and recipe totals, rounded to currency
- **Cost Preview**: Live cost resolution for authoring forms

## Error Handling

The API uses consistent error response formats with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints support pagination with the following query parameters:
- `page`: Page number (default: 1)
- `per_page`: Items per page (default: 20)
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "Bill of Materials", description = "Recipe authoring and costing endpoints"),
        (name = "Raw Materials", description = "Ingredient catalog endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // BOM types
            crate::models::BillOfMaterials,
            crate::models::BomLineItem,
            crate::models::BomStatus,
            crate::handlers::bom::CreateBOMRequest,
            crate::handlers::bom::LineItemRequest,
            crate::handlers::bom::UpdateBOMRequest,
            crate::handlers::bom::UpdateLineItemRequest,
            crate::handlers::bom::CostPreviewRequest,
            crate::services::billofmaterials::BomSummary,
            crate::services::billofmaterials::CostPreview,

            // Raw material types
            crate::models::RawMaterial,
            crate::handlers::materials::MaterialRequest,
            crate::handlers::materials::ImportMaterialsRequest,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("RecipeCost API"));
        assert!(json.contains("ErrorResponse"));
    }
}
