//! Per-unit cost resolution between a material's recorded price basis and the
//! unit a recipe line asks for.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::RawMaterial;

use super::units::{base_unit, same_family};

/// A fixed numeric conversion between two declared unit spellings. The factor
/// applies to the price: pricing per-gram from a per-kilogram price divides
/// by 1000.
#[derive(Debug, Clone, Copy)]
pub struct UnitConversion {
    pub from: &'static str,
    pub to: &'static str,
    pub factor: Decimal,
}

/// Conversion table, checked in order; first match is applied.
pub static UNIT_CONVERSIONS: Lazy<Vec<UnitConversion>> = Lazy::new(|| {
    vec![
        UnitConversion { from: "kg", to: "g", factor: dec!(0.001) },
        UnitConversion { from: "g", to: "kg", factor: dec!(1000) },
        UnitConversion { from: "kg", to: "grams", factor: dec!(0.001) },
        UnitConversion { from: "grams", to: "kg", factor: dec!(1000) },
        UnitConversion { from: "ltr", to: "ml", factor: dec!(0.001) },
        UnitConversion { from: "ml", to: "ltr", factor: dec!(1000) },
        UnitConversion { from: "liter", to: "ml", factor: dec!(0.001) },
        UnitConversion { from: "ml", to: "liter", factor: dec!(1000) },
    ]
});

/// Resolves the per-target-unit cost for a raw material.
///
/// Rule order, first match wins:
/// 1. exact base-unit match -> price unchanged
/// 2. exact full-string match -> price unchanged
/// 3. same alias family -> price unchanged (same declared cost basis)
/// 4. fixed mass/volume conversion -> price scaled
/// 5. fallback -> price unchanged
///
/// A missing material or a non-positive price resolves to zero. Total over
/// all inputs; label mismatches never block a recipe author.
pub fn resolve_unit_cost(material: Option<&RawMaterial>, target_unit: &str) -> Decimal {
    let Some(material) = material else {
        return Decimal::ZERO;
    };
    if material.unit_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let price = material.unit_price;
    let source_unit = material.unit_of_measure.trim().to_lowercase();
    let target_str = target_unit.trim().to_lowercase();
    let target_base = base_unit(&target_str);

    if source_unit == target_base || source_unit == target_str {
        return price;
    }

    if same_family(&source_unit, &target_base) {
        return price;
    }

    if let Some(conversion) = UNIT_CONVERSIONS
        .iter()
        .find(|c| c.from == source_unit && c.to == target_base)
    {
        // Normalize so scaled prices serialize without trailing zeros.
        return (price * conversion.factor).normalize();
    }

    // Unrecognized label pairing: assume the same cost basis rather than
    // blocking the form with an error.
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn material(uom: &str, price: Decimal) -> RawMaterial {
        RawMaterial::new("RM-001", "Test Material", uom, price)
    }

    #[test]
    fn missing_material_resolves_to_zero() {
        assert_eq!(resolve_unit_cost(None, "kg (Kilograms)"), Decimal::ZERO);
    }

    #[test]
    fn non_positive_price_resolves_to_zero() {
        let m = material("kg", Decimal::ZERO);
        assert_eq!(resolve_unit_cost(Some(&m), "kg (Kilograms)"), Decimal::ZERO);
        let m = material("kg", dec!(-3));
        assert_eq!(resolve_unit_cost(Some(&m), "kg (Kilograms)"), Decimal::ZERO);
    }

    #[test]
    fn exact_base_unit_match_returns_price() {
        let m = material("kg", dec!(5.00));
        assert_eq!(resolve_unit_cost(Some(&m), "kg (Kilograms)"), dec!(5.00));
        assert_eq!(resolve_unit_cost(Some(&m), "KG 2 (Kilograms2)"), dec!(5.00));
    }

    #[test]
    fn exact_full_string_match_returns_price() {
        let m = material("kg (Kilograms)", dec!(7.25));
        assert_eq!(resolve_unit_cost(Some(&m), "kg (Kilograms)"), dec!(7.25));
    }

    #[test]
    fn alias_family_match_keeps_price_unscaled() {
        let m = material("Litre", dec!(2.40));
        assert_eq!(resolve_unit_cost(Some(&m), "ltr (Liter)"), dec!(2.40));
        let m = material("pieces", dec!(0.90));
        assert_eq!(resolve_unit_cost(Some(&m), "pcs (Pieces)"), dec!(0.90));
    }

    #[test]
    fn kg_to_g_divides_by_thousand() {
        let m = material("kg", dec!(5.00));
        assert_eq!(resolve_unit_cost(Some(&m), "g (Gram)"), dec!(0.005));
    }

    #[test]
    fn g_to_kg_multiplies_by_thousand() {
        let m = material("g", dec!(0.005));
        assert_eq!(resolve_unit_cost(Some(&m), "kg (Kilograms)"), dec!(5.000));
    }

    #[test]
    fn ltr_to_ml_divides_by_thousand() {
        let m = material("ltr", dec!(3.00));
        assert_eq!(resolve_unit_cost(Some(&m), "ml (Milli Litre)"), dec!(0.003));
    }

    #[test]
    fn kg_gram_conversion_round_trips() {
        let m = material("kg", dec!(12.34));
        let per_gram = resolve_unit_cost(Some(&m), "g (Gram)");
        let back = material("g", per_gram);
        assert_eq!(resolve_unit_cost(Some(&back), "kg (Kilograms)"), dec!(12.34000));
    }

    #[test]
    fn unknown_pairing_falls_back_to_source_price() {
        let m = material("tray", dec!(4.10));
        assert_eq!(resolve_unit_cost(Some(&m), "kg (Kilograms)"), dec!(4.10));
    }
}
