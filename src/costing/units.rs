//! Canonical unit labels and unit-label matching.
//!
//! Raw material units are free text entered against a material master that
//! predates the fixed recipe-unit list, so every lookup here is fuzzy on
//! purpose and degrades to a safe default instead of failing.

/// Canonical unit labels offered to recipe authors, in display order.
///
/// Invariant: non-empty, and the first entry is the default fallback unit
/// (nested-recipe lines are always costed in `pcs`).
pub const FIXED_UNIT_OPTIONS: &[&str] = &[
    "pcs (Pieces)",
    "kg (Kilograms)",
    "g (Gram)",
    "ltr (Liter)",
    "ml (Milli Litre)",
    "box (Box)",
    "dz (Dozen)",
    "pr (Portion)",
    "m (Meter)",
    "cm (Centimeter)",
    "in (Inches)",
    "ft (Feet)",
    "kg 2 (Kilograms2)",
    "kg 5 (Kilograms5)",
];

/// Spellings treated as the same cost basis. Membership in the same row means
/// the recorded price carries over unchanged, with no numeric scaling.
pub const UNIT_FAMILIES: &[&[&str]] = &[
    &["kilogram", "kilograms", "kg"],
    &["piece", "pieces", "pcs"],
    &["gram", "grams", "g"],
    &["liter", "litre", "liters", "litres", "ltr", "l"],
    &["milliliter", "millilitre", "milliliters", "millilitres", "ml"],
    &["meter", "metre", "meters", "metres", "m"],
    &["centimeter", "centimetre", "centimeters", "centimetres", "cm"],
    &["inch", "inches", "in"],
    &["foot", "feet", "ft"],
    &["box", "boxes"],
    &["dozen", "dz"],
    &["portion", "portions", "pr"],
];

/// Extracts the base unit of a label: the prefix up to the first space or
/// `(`, trimmed and lower-cased. `"kg 2 (Kilograms2)"` -> `"kg"`.
pub fn base_unit(label: &str) -> String {
    let trimmed = label.trim();
    let end = trimmed
        .find(|c: char| c == ' ' || c == '(')
        .unwrap_or(trimmed.len());
    trimmed[..end].trim().to_lowercase()
}

/// True when both unit spellings appear in the same alias family.
pub fn same_family(a: &str, b: &str) -> bool {
    UNIT_FAMILIES.iter().any(|family| {
        family.iter().any(|u| u.eq_ignore_ascii_case(a))
            && family.iter().any(|u| u.eq_ignore_ascii_case(b))
    })
}

/// Maps a free-text material unit to the closest canonical option from
/// [`FIXED_UNIT_OPTIONS`], used to pre-fill a line's unit when a material is
/// selected. Total: always returns a displayable label.
pub fn match_unit_to_fixed_options(material_unit: &str) -> String {
    match_unit_against(FIXED_UNIT_OPTIONS, material_unit)
}

/// Same matching against an arbitrary option list. With an empty list the
/// input is returned unchanged.
pub fn match_unit_against(options: &[&str], material_unit: &str) -> String {
    let Some(default) = options.first() else {
        return material_unit.to_string();
    };

    let needle = material_unit.trim().to_lowercase();
    if needle.is_empty() {
        return (*default).to_string();
    }

    // Exact full-label match.
    if let Some(option) = options.iter().find(|o| o.to_lowercase() == needle) {
        return (*option).to_string();
    }

    // Base-unit matches, preferring an un-numbered variant: "kg (Kilograms)"
    // wins over "kg 2 (Kilograms2)".
    let base_matches: Vec<&str> = options
        .iter()
        .copied()
        .filter(|o| base_unit(o) == needle)
        .collect();
    if let Some(option) = base_matches.iter().find(|o| !second_token_is_numbered(o)) {
        return (*option).to_string();
    }
    if let Some(option) = base_matches.first() {
        return (*option).to_string();
    }

    // Partial match: option contains the input, or the option's base unit is
    // a substring of the input.
    if let Some(option) = options.iter().find(|o| {
        o.to_lowercase().contains(&needle) || needle.contains(&base_unit(o))
    }) {
        return (*option).to_string();
    }

    (*default).to_string()
}

fn second_token_is_numbered(label: &str) -> bool {
    label
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn option_list_is_non_empty_with_pcs_default() {
        assert_eq!(FIXED_UNIT_OPTIONS.first(), Some(&"pcs (Pieces)"));
    }

    #[test_case("kg (Kilograms)", "kg")]
    #[test_case("kg 2 (Kilograms2)", "kg")]
    #[test_case("ml (Milli Litre)", "ml")]
    #[test_case("  ltr (Liter) ", "ltr")]
    #[test_case("pcs", "pcs")]
    #[test_case("", "")]
    fn base_unit_takes_first_token(label: &str, expected: &str) {
        assert_eq!(base_unit(label), expected);
    }

    #[test]
    fn alias_families_are_case_insensitive() {
        assert!(same_family("KG", "kilograms"));
        assert!(same_family("l", "litres"));
        assert!(same_family("portion", "pr"));
        assert!(!same_family("kg", "g"));
        assert!(!same_family("ml", "ltr"));
    }

    #[test]
    fn empty_unit_falls_back_to_first_option() {
        assert_eq!(match_unit_to_fixed_options(""), "pcs (Pieces)");
        assert_eq!(match_unit_to_fixed_options("   "), "pcs (Pieces)");
    }

    #[test]
    fn exact_label_match_wins() {
        assert_eq!(match_unit_to_fixed_options("ML (Milli Litre)"), "ml (Milli Litre)");
    }

    #[test]
    fn base_match_prefers_unnumbered_variant() {
        assert_eq!(match_unit_to_fixed_options("kg"), "kg (Kilograms)");
        assert_eq!(match_unit_to_fixed_options("KG"), "kg (Kilograms)");
    }

    #[test]
    fn numbered_variant_is_used_when_it_is_the_only_base_match() {
        let options = ["kg 2 (Kilograms2)", "g (Gram)"];
        assert_eq!(match_unit_against(&options, "kg"), "kg 2 (Kilograms2)");
    }

    #[test]
    fn partial_match_applies_when_base_does_not() {
        // "kilograms" is a substring match against the kg option label.
        assert_eq!(match_unit_to_fixed_options("kilograms"), "kg (Kilograms)");
    }

    #[test]
    fn unmatched_unit_falls_back_to_default() {
        assert_eq!(match_unit_to_fixed_options("bundle"), "pcs (Pieces)");
    }

    #[test]
    fn empty_option_list_returns_input_unchanged() {
        assert_eq!(match_unit_against(&[], "kg"), "kg");
    }
}
