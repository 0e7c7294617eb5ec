//! Workbook decoding - binary .xlsx container → per-sheet grids.
//!
//! Pure decode, no side effects. Grids use absolute row/column positions
//! (calamine ranges are offset to the first used cell, so sheets whose
//! content starts below A1 are padded back out), which the anchor locator
//! and field specs rely on.

use crate::error::{RosterError, RosterResult};
use crate::types::{CellValue, SheetGrid};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// One template worksheet: its value grid plus the absolute positions of
/// template-authored formulas (shared-formula members included).
#[derive(Debug, Clone)]
pub struct TemplateSheet {
    pub grid: SheetGrid,
    formulas: BTreeMap<(usize, usize), String>,
}

impl TemplateSheet {
    pub fn has_formula(&self, row: usize, col: usize) -> bool {
        self.formulas.contains_key(&(row, col))
    }

    pub fn formulas(&self) -> impl Iterator<Item = (&(usize, usize), &String)> {
        self.formulas.iter()
    }
}

/// Decode a workbook file into one grid per sheet.
pub fn read_workbook(path: &Path) -> RosterResult<Vec<SheetGrid>> {
    let workbook: Xlsx<BufReader<File>> = open_workbook(path)
        .map_err(|e: calamine::XlsxError| RosterError::UnreadableDocument(e.to_string()))?;
    Ok(read_grids(workbook))
}

/// Decode an in-memory workbook blob.
pub fn read_workbook_from_bytes(bytes: &[u8]) -> RosterResult<Vec<SheetGrid>> {
    let workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e: calamine::XlsxError| RosterError::UnreadableDocument(e.to_string()))?;
    Ok(read_grids(workbook))
}

/// Decode a template file, keeping formula occupancy alongside the values.
pub fn read_template(path: &Path) -> RosterResult<Vec<TemplateSheet>> {
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)
        .map_err(|e: calamine::XlsxError| RosterError::UnreadableDocument(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();
    for name in sheet_names {
        let grid = match workbook.worksheet_range(&name) {
            Ok(range) => grid_from_range(&name, &range),
            Err(_) => SheetGrid::new(name.clone(), vec![]),
        };
        let formulas = match workbook.worksheet_formula(&name) {
            Ok(range) => formulas_from_range(&range),
            Err(_) => BTreeMap::new(),
        };
        sheets.push(TemplateSheet { grid, formulas });
    }
    Ok(sheets)
}

fn read_grids<RS: std::io::Read + std::io::Seek>(mut workbook: Xlsx<RS>) -> Vec<SheetGrid> {
    let sheet_names = workbook.sheet_names().to_vec();
    sheet_names
        .into_iter()
        .map(|name| match workbook.worksheet_range(&name) {
            Ok(range) => grid_from_range(&name, &range),
            Err(_) => SheetGrid::new(name, vec![]),
        })
        .collect()
}

fn grid_from_range(name: &str, range: &Range<Data>) -> SheetGrid {
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return SheetGrid::new(name, vec![]),
    };
    let (height, width) = range.get_size();

    let mut rows =
        vec![vec![CellValue::Empty; start_col + width]; start_row + height];
    for r in 0..height {
        for c in 0..width {
            if let Some(cell) = range.get((r, c)) {
                rows[start_row + r][start_col + c] = convert_cell(cell);
            }
        }
    }
    SheetGrid::new(name, rows)
}

fn formulas_from_range(range: &Range<String>) -> BTreeMap<(usize, usize), String> {
    let mut formulas = BTreeMap::new();
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return formulas,
    };
    let (height, width) = range.get_size();
    for r in 0..height {
        for c in 0..width {
            if let Some(formula) = range.get((r, c)) {
                if !formula.is_empty() {
                    formulas.insert((start_row + r, start_col + c), formula.clone());
                }
            }
        }
    }
    formulas
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        // Booleans flow through the string-keyed coercions.
        Data::Bool(b) => CellValue::Text(if *b { "true" } else { "false" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Date(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(naive) => CellValue::Date(naive),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_unreadable_document() {
        let err = read_workbook_from_bytes(b"not a zip container").unwrap_err();
        assert!(matches!(err, RosterError::UnreadableDocument(_)));
    }

    #[test]
    fn missing_file_is_unreadable_document() {
        let err = read_workbook(Path::new("/no/such/workbook.xlsx")).unwrap_err();
        assert!(matches!(err, RosterError::UnreadableDocument(_)));
    }

    #[test]
    fn bool_cells_become_truthy_text() {
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Text("true".into()));
        assert_eq!(convert_cell(&Data::Bool(false)), CellValue::Text("false".into()));
    }

    #[test]
    fn error_cells_read_empty() {
        assert_eq!(
            convert_cell(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Empty
        );
    }

    #[test]
    fn iso_date_strings_become_dates() {
        match convert_cell(&Data::DateTimeIso("2025-06-01".to_string())) {
            CellValue::Date(d) => assert_eq!(d.format("%Y-%m-%d").to_string(), "2025-06-01"),
            other => panic!("expected date, got {:?}", other),
        }
    }
}
