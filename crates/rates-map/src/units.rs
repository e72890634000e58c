//! Unit synonym classes and compatibility.

use std::collections::BTreeSet;

use crate::text::normalize_text;

/// Separator between alternative units in one field (`m2/m3`).
pub const UNIT_ALTERNATIVE_SEPARATOR: char = '/';

/// Canonical unit followed by every spelling that means the same thing.
pub const UNIT_CLASSES: &[(&str, &[&str])] = &[
    ("m²", &["m²", "m2", "sqm", "sq.m", "sq m", "m^2"]),
    ("m³", &["m³", "m3", "cum", "cu.m", "cu m", "m^3"]),
    ("m", &["m", "lm", "lin.m", "linear m", "l.m"]),
    ("nr", &["nr", "no", "no.", "each", "item", "ea"]),
    ("t", &["t", "tonne", "tonnes"]),
    ("kg", &["kg", "kgs"]),
    ("hr", &["hr", "hrs", "hour", "hours"]),
    ("ls", &["ls", "lump sum", "sum", "prov"]),
];

/// Canonical spelling of a single unit; unknown units come back lowercased.
pub fn normalize_unit(raw: &str) -> String {
    let unit = normalize_text(raw);
    UNIT_CLASSES
        .iter()
        .find(|(_, spellings)| spellings.contains(&unit.as_str()))
        .map_or(unit, |(canonical, _)| (*canonical).to_string())
}

fn alternatives(raw: &str) -> BTreeSet<String> {
    raw.split(UNIT_ALTERNATIVE_SEPARATOR)
        .map(normalize_unit)
        .filter(|unit| !unit.is_empty())
        .collect()
}

/// True when the two unit fields share a unit class.
///
/// Either side may list alternatives separated by `/`; a blank unit is never
/// compatible with anything.
pub fn units_compatible(a: &str, b: &str) -> bool {
    let left = alternatives(a);
    if left.is_empty() {
        return false;
    }
    let right = alternatives(b);
    !left.is_disjoint(&right)
}
