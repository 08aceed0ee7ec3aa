use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Recipe lifecycle status. Authored directly by the user; no transition
/// validation beyond membership in this set.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum BomStatus {
    #[default]
    Draft,
    Active,
    Inactive,
    Obsolete,
}

/// A single recipe line: either a raw material priced from the material
/// master, or a nested recipe priced at that recipe's rolled-up total.
///
/// Invariant after any edit: `total_cost == round2(quantity * unit_cost)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "item_type")]
pub enum BomLineItem {
    #[serde(rename = "rawMaterial")]
    RawMaterial {
        material_code: String,
        material_name: String,
        material_id: Option<Uuid>,
        quantity: Decimal,
        unit_of_measure: String,
        unit_cost: Decimal,
        total_cost: Decimal,
    },
    #[serde(rename = "bom")]
    Recipe {
        bom_code: String,
        bom_id: Option<Uuid>,
        /// The referenced recipe's product name.
        material_name: String,
        quantity: Decimal,
        /// Always "pcs" for nested recipes.
        unit_of_measure: String,
        unit_cost: Decimal,
        total_cost: Decimal,
    },
}

impl BomLineItem {
    pub fn quantity(&self) -> Decimal {
        match self {
            Self::RawMaterial { quantity, .. } | Self::Recipe { quantity, .. } => *quantity,
        }
    }

    pub fn unit_of_measure(&self) -> &str {
        match self {
            Self::RawMaterial { unit_of_measure, .. } | Self::Recipe { unit_of_measure, .. } => {
                unit_of_measure
            }
        }
    }

    pub fn unit_cost(&self) -> Decimal {
        match self {
            Self::RawMaterial { unit_cost, .. } | Self::Recipe { unit_cost, .. } => *unit_cost,
        }
    }

    pub fn total_cost(&self) -> Decimal {
        match self {
            Self::RawMaterial { total_cost, .. } | Self::Recipe { total_cost, .. } => *total_cost,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::RawMaterial { material_name, .. } | Self::Recipe { material_name, .. } => {
                material_name
            }
        }
    }
}

/// A versioned recipe: line items plus a rolled-up total cost, recomputed on
/// every line mutation and never stored stale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BillOfMaterials {
    pub id: Uuid,
    pub bom_code: String,
    pub product_name: String,
    pub version: String,
    pub status: BomStatus,
    pub items: Vec<BomLineItem>,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_items_serialize_with_item_type_tag() {
        let line = BomLineItem::RawMaterial {
            material_code: "RM-001".into(),
            material_name: "Flour".into(),
            material_id: None,
            quantity: dec!(2.5),
            unit_of_measure: "kg (Kilograms)".into(),
            unit_cost: dec!(5.00),
            total_cost: dec!(12.50),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["item_type"], "rawMaterial");

        let line = BomLineItem::Recipe {
            bom_code: "BOM-0001".into(),
            bom_id: None,
            material_name: "Tomato Base".into(),
            quantity: dec!(2),
            unit_of_measure: "pcs".into(),
            unit_cost: dec!(12.50),
            total_cost: dec!(25.00),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["item_type"], "bom");
    }

    #[test]
    fn status_round_trips_through_display_and_parse() {
        for status in [
            BomStatus::Draft,
            BomStatus::Active,
            BomStatus::Inactive,
            BomStatus::Obsolete,
        ] {
            let parsed: BomStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
