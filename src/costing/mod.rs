//! Recipe costing core: unit-of-measure normalization, per-unit cost
//! resolution, and line/recipe cost rollup.
//!
//! Everything in this module is pure and total: no I/O, no errors, no
//! framework types. The HTTP and service layers call in here every time a
//! material or nested recipe is selected, or a quantity or unit changes.

pub mod resolver;
pub mod rollup;
pub mod units;

pub use resolver::{resolve_unit_cost, UnitConversion, UNIT_CONVERSIONS};
pub use rollup::{
    recompute_line, recompute_recipe_total, round_currency, NESTED_RECIPE_UNIT,
};
pub use units::{
    base_unit, match_unit_to_fixed_options, same_family, FIXED_UNIT_OPTIONS, UNIT_FAMILIES,
};
