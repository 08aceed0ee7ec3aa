use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A raw material from the material master. Read-only input to costing:
/// `unit_price` is the price for one `unit_of_measure`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct RawMaterial {
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Material code must be between 1-50 characters"
    ))]
    pub material_code: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Material name must be between 1-200 characters"
    ))]
    pub material_name: String,

    /// Free-text unit label exactly as entered in the material master,
    /// e.g. "kg", "Litre", "pcs". Matching against the fixed recipe units
    /// happens in the costing layer.
    pub unit_of_measure: String,

    /// Non-negative price per one `unit_of_measure`.
    pub unit_price: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RawMaterial {
    pub fn new(
        material_code: impl Into<String>,
        material_name: impl Into<String>,
        unit_of_measure: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            material_code: material_code.into(),
            material_name: material_name.into(),
            unit_of_measure: unit_of_measure.into(),
            unit_price,
            created_at: now,
            updated_at: now,
        }
    }
}
