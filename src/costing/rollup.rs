//! Line and recipe cost recomputation.
//!
//! Every function here is a pure fold over current form state: recomputation
//! is idempotent and safe to run after any edit, and incomplete lines
//! (quantity typed but material not yet selected, stale nested reference)
//! produce zero cost instead of an error.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{BomLineItem, RawMaterial};

use super::resolver::resolve_unit_cost;

/// Unit label forced onto nested-recipe lines.
pub const NESTED_RECIPE_UNIT: &str = "pcs";

/// Monetary rounding: half away from zero at 2 decimal places.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Recomputes `unit_cost` and `total_cost` for one line.
///
/// Raw-material lines price from `material` through the unit-cost resolver;
/// nested-recipe lines price at `nested_total` (the referenced recipe's
/// rolled-up total) and have their unit forced to `"pcs"`. A missing source
/// on either side yields zero cost.
pub fn recompute_line(
    line: &mut BomLineItem,
    material: Option<&RawMaterial>,
    nested_total: Option<Decimal>,
) {
    match line {
        BomLineItem::RawMaterial {
            quantity,
            unit_of_measure,
            unit_cost,
            total_cost,
            ..
        } => {
            *unit_cost = resolve_unit_cost(material, unit_of_measure);
            *total_cost = line_total(*quantity, *unit_cost);
        }
        BomLineItem::Recipe {
            quantity,
            unit_of_measure,
            unit_cost,
            total_cost,
            ..
        } => {
            *unit_of_measure = NESTED_RECIPE_UNIT.to_string();
            *unit_cost = nested_total.unwrap_or(Decimal::ZERO);
            *total_cost = line_total(*quantity, *unit_cost);
        }
    }
}

/// Recipe grand total: rounded sum of line totals.
pub fn recompute_recipe_total(items: &[BomLineItem]) -> Decimal {
    round_currency(items.iter().map(BomLineItem::total_cost).sum())
}

fn line_total(quantity: Decimal, unit_cost: Decimal) -> Decimal {
    // Non-positive quantities cost nothing rather than failing validation
    // here; the form layer owns rejecting them on submit.
    if quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_currency(quantity * unit_cost)
}
