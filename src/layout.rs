//! Versioned column layouts.
//!
//! A layout is data, not code: one ordered [`FieldSpec`] table per template
//! version, plus the derived-field dependency pairs and the header probes
//! used to detect template drift. Swapping a layout never touches the
//! extraction logic.

use crate::core::coerce::CoercionRule;
use serde::{Deserialize, Serialize};

/// Maps one positional column onto one named record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub target: String,
    pub column: usize,
    pub rule: CoercionRule,
}

impl FieldSpec {
    pub fn new(target: &str, column: usize, rule: CoercionRule) -> Self {
        Self {
            target: target.to_string(),
            column,
            rule,
        }
    }
}

/// A total field recomputed from its components when not supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedField {
    pub target: String,
    pub components: Vec<String>,
}

impl DerivedField {
    pub fn new(target: &str, components: &[&str]) -> Self {
        Self {
            target: target.to_string(),
            components: components.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One versioned sheet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    pub version: String,
    /// Ordered positional column map.
    pub fields: Vec<FieldSpec>,
    /// (column, expected header substring) pairs checked against the header
    /// row; a mismatch is surfaced as a drift diagnostic, nothing more.
    pub header_probes: Vec<(usize, String)>,
    /// Evaluated in order, so later totals see already-filled sub-totals.
    pub derived: Vec<DerivedField>,
}

impl LayoutTable {
    /// Column index of the identifying-name field, used by row
    /// classification. Falls back to 0 when a layout omits `name`.
    pub fn name_column(&self) -> usize {
        self.fields
            .iter()
            .find(|f| f.target == crate::types::FIELD_NAME)
            .map(|f| f.column)
            .unwrap_or(0)
    }
}

fn probes(list: &[(usize, &str)]) -> Vec<(usize, String)> {
    list.iter().map(|(c, s)| (*c, s.to_string())).collect()
}

/// The faculty-profile layout shipped with the current reporting template.
pub fn faculty_layout_v2() -> LayoutTable {
    use CoercionRule::*;
    LayoutTable {
        version: "v2".to_string(),
        fields: vec![
            FieldSpec::new("name", 1, TruncatedString { max_len: 255 }),
            FieldSpec::new("gender", 2, EnumLookup { table: "gender".into() }),
            FieldSpec::new("faculty_group", 3, TruncatedString { max_len: 16 }),
            FieldSpec::new("faculty_type", 4, EnumLookup { table: "faculty_type".into() }),
            FieldSpec::new("rank", 5, TruncatedString { max_len: 100 }),
            FieldSpec::new("tenured", 6, TenureFlag),
            FieldSpec::new("highest_degree", 7, TruncatedString { max_len: 100 }),
            FieldSpec::new("graduate_units", 8, Integer),
            FieldSpec::new("full_time", 9, BooleanFlag),
            FieldSpec::new("lecture_hours", 10, BoundedFloat { min: 0.0, max: 60.0 }),
            FieldSpec::new("lab_hours", 11, BoundedFloat { min: 0.0, max: 60.0 }),
            FieldSpec::new("teaching_hours", 12, BoundedFloat { min: 0.0, max: 120.0 }),
            FieldSpec::new("research_hours", 13, BoundedFloat { min: 0.0, max: 60.0 }),
            FieldSpec::new("extension_hours", 14, BoundedFloat { min: 0.0, max: 60.0 }),
            FieldSpec::new("admin_hours", 15, BoundedFloat { min: 0.0, max: 60.0 }),
            FieldSpec::new("total_hours", 16, BoundedFloat { min: 0.0, max: 240.0 }),
        ],
        header_probes: probes(&[(1, "name"), (2, "gender"), (5, "rank")]),
        derived: vec![
            DerivedField::new("teaching_hours", &["lecture_hours", "lab_hours"]),
            DerivedField::new(
                "total_hours",
                &["teaching_hours", "research_hours", "extension_hours", "admin_hours"],
            ),
        ],
    }
}

/// Legacy layout: same fields, no leading sequence column (everything
/// shifted left by one).
pub fn faculty_layout_v1() -> LayoutTable {
    let mut layout = faculty_layout_v2();
    layout.version = "v1".to_string();
    for field in &mut layout.fields {
        field.column -= 1;
    }
    for probe in &mut layout.header_probes {
        probe.0 -= 1;
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_name_column() {
        assert_eq!(faculty_layout_v2().name_column(), 1);
        assert_eq!(faculty_layout_v1().name_column(), 0);
    }

    #[test]
    fn derived_order_is_bottom_up() {
        let layout = faculty_layout_v2();
        let teaching = layout.derived.iter().position(|d| d.target == "teaching_hours");
        let total = layout.derived.iter().position(|d| d.target == "total_hours");
        assert!(teaching < total, "sub-totals must be filled before the overall total");
    }

    #[test]
    fn layout_round_trips_through_yaml() {
        let layout = faculty_layout_v2();
        let yaml = serde_yaml::to_string(&layout).unwrap();
        let back: LayoutTable = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(layout, back);
    }
}
