//! Row classification and positional field extraction.
//!
//! Per-row outcome is `Option<DomainRecord>`, never an error: a row with a
//! blank identifying-name cell, or no content at all, simply produces no
//! record. Trailing blank rows in a human-edited sheet are normal.

use crate::core::coerce::{coerce, CoercionContext};
use crate::layout::LayoutTable;
use crate::types::{DomainRecord, SheetGrid};

/// Records extracted from one sheet plus the count of rows skipped by
/// classification.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<DomainRecord>,
    pub skipped_rows: usize,
}

pub fn extract_rows(
    grid: &SheetGrid,
    data_start: usize,
    layout: &LayoutTable,
    ctx: &CoercionContext,
) -> Extraction {
    let mut out = Extraction::default();
    for row in data_start..grid.row_count() {
        match extract_row(grid, row, layout, ctx) {
            Some(record) => out.records.push(record),
            None => out.skipped_rows += 1,
        }
    }
    out
}

/// One row → one record, or `None` when the row is excluded.
pub fn extract_row(
    grid: &SheetGrid,
    row: usize,
    layout: &LayoutTable,
    ctx: &CoercionContext,
) -> Option<DomainRecord> {
    if grid.cell(row, layout.name_column()).is_empty() {
        return None;
    }
    if grid.row_is_blank(row) {
        return None;
    }

    let mut record = DomainRecord::new();
    for spec in &layout.fields {
        let value = coerce(&spec.rule, grid.cell(row, spec.column), ctx);
        record.set(spec.target.clone(), value);
    }
    Some(record)
}

/// Compare a header row against the layout's probes.
///
/// Returns a human-readable description of the first mismatch, or `None`
/// when the header looks like the expected template version. Positional
/// mapping is not altered either way; a mismatch only feeds a diagnostic.
pub fn check_layout_drift(
    grid: &SheetGrid,
    header_row: usize,
    layout: &LayoutTable,
) -> Option<String> {
    if layout.header_probes.is_empty() {
        return None;
    }
    for (col, expected) in &layout.header_probes {
        let actual = grid.cell(header_row, *col).as_text();
        if !actual.to_lowercase().contains(&expected.to_lowercase()) {
            return Some(format!(
                "column {} reads '{}', expected something like '{}' (layout {})",
                col, actual, expected, layout.version
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::types::{CellValue, FieldValue};

    fn setup() -> (RosterConfig, CoercionContext) {
        let config = RosterConfig::default();
        let ctx = config.coercion_context();
        (config, ctx)
    }

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    // Rows shaped for the v2 layout (name at column 1).
    fn faculty_row(name: &str) -> Vec<CellValue> {
        vec![
            n(1.0),
            t(name),
            t("M"),
            t("A1"),
            t("FT"),
            t("Professor"),
            t("tenured"),
            t("PhD"),
            n(12.0),
            t("yes"),
            n(10.0),
            n(5.0),
            CellValue::Empty, // teaching_hours left for the calculator
            n(3.0),
            n(2.0),
            n(1.0),
            CellValue::Empty, // total_hours left for the calculator
        ]
    }

    #[test]
    fn empty_name_row_is_excluded_regardless_of_other_cells() {
        let (config, ctx) = setup();
        let layout = config.layout().unwrap();
        let mut row = faculty_row("Ada");
        row[1] = t("   ");
        let grid = SheetGrid::new("s", vec![row]);
        assert!(extract_row(&grid, 0, layout, &ctx).is_none());
    }

    #[test]
    fn blank_row_is_excluded() {
        let (config, ctx) = setup();
        let layout = config.layout().unwrap();
        let grid = SheetGrid::new("s", vec![vec![CellValue::Empty; 17]]);
        assert!(extract_row(&grid, 0, layout, &ctx).is_none());
    }

    #[test]
    fn full_row_maps_every_field() {
        let (config, ctx) = setup();
        let layout = config.layout().unwrap();
        let grid = SheetGrid::new("s", vec![faculty_row("Ada Lovelace")]);
        let record = extract_row(&grid, 0, layout, &ctx).unwrap();

        assert_eq!(record.get("name"), Some(&FieldValue::Text("Ada Lovelace".into())));
        assert_eq!(record.get("gender"), Some(&FieldValue::Int(1)));
        assert_eq!(record.get("faculty_type"), Some(&FieldValue::Int(1)));
        assert_eq!(record.get("tenured"), Some(&FieldValue::Text("Yes".into())));
        assert_eq!(record.get("full_time"), Some(&FieldValue::Int(1)));
        assert_eq!(record.get("lecture_hours"), Some(&FieldValue::Float(10.0)));
        // Unset totals coerce to the rule default, ready for derivation.
        assert_eq!(record.get("teaching_hours"), Some(&FieldValue::Float(0.0)));
    }

    #[test]
    fn short_row_reads_empty_past_its_width() {
        let (config, ctx) = setup();
        let layout = config.layout().unwrap();
        // Only the name cell present; every other field coerces its default.
        let grid = SheetGrid::new("s", vec![vec![CellValue::Empty, t("Ada")]]);
        let record = extract_row(&grid, 0, layout, &ctx).unwrap();
        assert_eq!(record.get("gender"), Some(&FieldValue::Int(0)));
        assert_eq!(record.get("total_hours"), Some(&FieldValue::Float(0.0)));
    }

    #[test]
    fn extract_rows_counts_skips() {
        let (config, ctx) = setup();
        let layout = config.layout().unwrap();
        let mut nameless = faculty_row("x");
        nameless[1] = CellValue::Empty;
        let grid = SheetGrid::new(
            "s",
            vec![faculty_row("Ada"), nameless, faculty_row("Grace"), vec![]],
        );
        let out = extract_rows(&grid, 0, layout, &ctx);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.skipped_rows, 2);
    }

    #[test]
    fn drift_probe_flags_shifted_header() {
        let (config, _) = setup();
        let layout = config.layout().unwrap();
        let header = vec![t("Faculty Name"), t("Gender"), t("Group")]; // v1-shaped
        let grid = SheetGrid::new("s", vec![header, faculty_row("Ada")]);
        let drift = check_layout_drift(&grid, 0, layout);
        assert!(drift.is_some());
        assert!(drift.unwrap().contains("layout v2"));
    }

    #[test]
    fn matching_header_reports_no_drift() {
        let (config, _) = setup();
        let layout = config.layout().unwrap();
        let header = vec![
            t("No."),
            t("Faculty Name"),
            t("Gender"),
            t("Group"),
            t("Type"),
            t("Academic Rank"),
        ];
        let grid = SheetGrid::new("s", vec![header, faculty_row("Ada")]);
        assert_eq!(check_layout_drift(&grid, 0, layout), None);
    }

    #[test]
    fn layout_without_probes_never_reports_drift() {
        let (config, _) = setup();
        let mut layout = config.layout().unwrap().clone();
        layout.header_probes.clear();
        let grid = SheetGrid::new("s", vec![faculty_row("Ada")]);
        assert_eq!(check_layout_drift(&grid, 0, &layout), None);
    }
}
