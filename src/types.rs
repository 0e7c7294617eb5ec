use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//==============================================================================
// Well-known field names
//==============================================================================

/// Identifying-name field; rows without it are skipped by the extractor.
pub const FIELD_NAME: &str = "name";
/// Categorical discriminator used by the export partitioner.
pub const FIELD_GROUP: &str = "faculty_group";
/// Owning-aggregate foreign key attached from caller context.
pub const FIELD_INSTITUTION: &str = "institution_id";
/// Reporting period attached from caller context.
pub const FIELD_PERIOD: &str = "report_period";

//==============================================================================
// Cells and grids
//==============================================================================

/// One raw spreadsheet cell, as decoded from the document container.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Empty,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringified view used by the text-keyed coercions.
    ///
    /// Integral numbers render without a trailing `.0` so `Number(1.0)`
    /// matches the `"1"` key of an enum table.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Numeric view; text cells get a best-effort parse.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// One worksheet as an ordered grid of rows.
///
/// Out-of-range access through [`SheetGrid::cell`] yields `Empty`, never an
/// error, so positional field specs can read past short rows safely.
#[derive(Debug, Clone)]
pub struct SheetGrid {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// True when every cell of the row is empty (or the row is out of range).
    pub fn row_is_blank(&self, row: usize) -> bool {
        match self.rows.get(row) {
            Some(r) => r.iter().all(|c| c.is_empty()),
            None => true,
        }
    }

    /// True when no cell anywhere in the grid holds a value.
    pub fn is_blank(&self) -> bool {
        (0..self.rows.len()).all(|r| self.row_is_blank(r))
    }
}

//==============================================================================
// Records
//==============================================================================

/// Canonical field value produced by a coercion rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view used by the derived-field calculator.
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Int(i) => *i as f64,
            FieldValue::Float(f) => *f,
            FieldValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Int(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One coerced roster record: a flat field-name → value mapping.
///
/// Always carries [`FIELD_INSTITUTION`], [`FIELD_GROUP`] and [`FIELD_PERIOD`]
/// once it leaves the import pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainRecord {
    pub fields: BTreeMap<String, FieldValue>,
}

impl DomainRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Numeric view of a field; missing fields read as 0.
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).map(|v| v.as_f64()).unwrap_or(0.0)
    }

    /// Text view of a field; missing fields read as "".
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(|v| v.to_string()).unwrap_or_default()
    }
}

//==============================================================================
// Diagnostics and reports
//==============================================================================

/// Non-fatal, per-sheet / per-bucket condition accumulated into a report.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Sheet decoded but holds no cells at all.
    EmptySheet { sheet: String },
    /// Sheet has content but no row survived classification.
    NoDataRows { sheet: String },
    /// Header row does not match the active layout's probes.
    LayoutDrift { sheet: String, detail: String },
    /// No template sheet matches the bucket's canonical name.
    UnresolvedTemplateSheet { group: String, wanted: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptySheet { sheet } => write!(f, "sheet '{}' is empty", sheet),
            Diagnostic::NoDataRows { sheet } => {
                write!(f, "sheet '{}' produced no records", sheet)
            }
            Diagnostic::LayoutDrift { sheet, detail } => {
                write!(f, "sheet '{}' header does not match the expected layout: {}", sheet, detail)
            }
            Diagnostic::UnresolvedTemplateSheet { group, wanted } => {
                write!(f, "no template sheet named '{}' for group '{}'; bucket skipped", wanted, group)
            }
        }
    }
}

/// Outcome of reading one workbook: extracted records plus diagnostics.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub records: Vec<DomainRecord>,
    pub sheets_read: usize,
    pub skipped_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of composing one export document.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub sheets_written: Vec<String>,
    pub rows_written: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_out_of_range_reads_empty() {
        let grid = SheetGrid::new("s", vec![vec![CellValue::Text("a".into())]]);
        assert_eq!(*grid.cell(0, 0), CellValue::Text("a".into()));
        assert_eq!(*grid.cell(0, 99), CellValue::Empty);
        assert_eq!(*grid.cell(99, 0), CellValue::Empty);
    }

    #[test]
    fn integral_number_stringifies_without_decimal() {
        assert_eq!(CellValue::Number(1.0).as_text(), "1");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
    }

    #[test]
    fn whitespace_text_counts_as_empty() {
        assert!(CellValue::Text("   ".into()).is_empty());
        assert!(!CellValue::Text(" x ".into()).is_empty());
    }

    #[test]
    fn record_serializes_as_flat_map() {
        let mut rec = DomainRecord::new();
        rec.set("name", FieldValue::Text("Ada".into()));
        rec.set("units", FieldValue::Int(3));
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"name":"Ada","units":3}"#);
    }

    #[test]
    fn record_deserializes_ints_and_floats() {
        let rec: DomainRecord =
            serde_json::from_str(r#"{"units": 3, "load": 1.5, "name": "Ada"}"#).unwrap();
        assert_eq!(rec.get("units"), Some(&FieldValue::Int(3)));
        assert_eq!(rec.get("load"), Some(&FieldValue::Float(1.5)));
        assert_eq!(rec.number("missing"), 0.0);
    }
}
