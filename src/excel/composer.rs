//! Template-driven export composition.
//!
//! Each group bucket is written into the template sheet matching its
//! canonical name. Template-authored formula cells are re-emitted from the
//! template and never overwritten with data; stale value rows left over from
//! a previous use of the template are not carried into the output. A bucket
//! whose sheet cannot be resolved is skipped with a diagnostic, leaving the
//! rest of the export intact.

use crate::config::RosterConfig;
use crate::core::locate_data_start;
use crate::error::{RosterError, RosterResult};
use crate::excel::reader::{read_template, TemplateSheet};
use crate::layout::LayoutTable;
use crate::types::{CellValue, Diagnostic, DomainRecord, ExportReport, FieldValue};
use chrono::NaiveDate;
use rust_xlsxwriter::{Formula, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::{debug, trace};

/// Per-sheet composition progress. Resolution failure jumps straight to the
/// terminal `Skipped` without touching the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    TemplateResolved,
    CaptionWritten,
    HeaderWritten,
    StaleRowsCleared,
    DataRowsWritten,
    Done,
    Skipped,
}

impl SheetState {
    pub fn next(self) -> SheetState {
        use SheetState::*;
        match self {
            TemplateResolved => CaptionWritten,
            CaptionWritten => HeaderWritten,
            HeaderWritten => StaleRowsCleared,
            StaleRowsCleared => DataRowsWritten,
            DataRowsWritten => Done,
            terminal => terminal,
        }
    }
}

// Rows taken by the caption block (report title, group label) at the top of
// every composed sheet. The header-caption row sits directly below it, so
// the first row data can occupy is CAPTION_ROWS + 1; an anchor resolving
// above that would put data inside the caption/header block.
const CAPTION_ROWS: usize = 2;

pub struct TemplateComposer {
    sheets: Vec<TemplateSheet>,
}

impl TemplateComposer {
    pub fn from_path(path: &Path) -> RosterResult<Self> {
        Ok(Self {
            sheets: read_template(path)?,
        })
    }

    pub fn new(sheets: Vec<TemplateSheet>) -> Self {
        Self { sheets }
    }

    /// Compose the export document for a set of group buckets.
    ///
    /// Template sheets keep their order; untargeted sheets are carried
    /// through verbatim. Returns the finished workbook bytes plus the
    /// accumulated per-bucket diagnostics.
    pub fn compose(
        &self,
        buckets: &[(String, Vec<DomainRecord>)],
        config: &RosterConfig,
    ) -> RosterResult<(Vec<u8>, ExportReport)> {
        let layout = config.layout()?;
        let mut workbook = Workbook::new();
        let mut report = ExportReport::default();
        let mut consumed = vec![false; buckets.len()];

        for template in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&template.grid.name)
                .map_err(export_err)?;

            let target = buckets.iter().position(|(code, _)| {
                config
                    .sheet_name_for(code)
                    .eq_ignore_ascii_case(template.grid.name.trim())
            });

            match target {
                Some(idx) => {
                    consumed[idx] = true;
                    let (code, records) = &buckets[idx];
                    let state =
                        compose_sheet(worksheet, template, code, records, config, layout)?;
                    debug!(sheet = %template.grid.name, rows = records.len(), ?state, "composed group sheet");
                    report.sheets_written.push(template.grid.name.clone());
                    report.rows_written += records.len();
                }
                None => copy_sheet(worksheet, template)?,
            }
        }

        for (idx, (code, _)) in buckets.iter().enumerate() {
            if !consumed[idx] {
                trace!(group = %code, state = ?SheetState::Skipped, "bucket without template sheet");
                report.diagnostics.push(Diagnostic::UnresolvedTemplateSheet {
                    group: code.clone(),
                    wanted: config.sheet_name_for(code),
                });
            }
        }

        let bytes = workbook.save_to_buffer().map_err(export_err)?;
        Ok((bytes, report))
    }
}

fn compose_sheet(
    worksheet: &mut Worksheet,
    template: &TemplateSheet,
    group_code: &str,
    records: &[DomainRecord],
    config: &RosterConfig,
    layout: &LayoutTable,
) -> RosterResult<SheetState> {
    let mut state = SheetState::TemplateResolved;

    // Two-row caption block: report title, then the group label.
    if !template.has_formula(0, 0) {
        worksheet
            .write_string(0, 0, &config.report_title)
            .map_err(export_err)?;
    }
    if !template.has_formula(1, 0) {
        worksheet
            .write_string(1, 0, &config.sheet_name_for(group_code))
            .map_err(export_err)?;
    }
    state = state.next();
    trace!(sheet = %template.grid.name, ?state);

    let data_start = locate_data_start(&template.grid, &config.anchor).max(CAPTION_ROWS + 1);
    let header_row = data_start - 1;

    // Fixed header-caption row, right above the data block.
    for (col, caption) in config.header_captions.iter().enumerate() {
        if !template.has_formula(header_row, col) {
            worksheet
                .write_string(header_row as u32, col as u16, caption)
                .map_err(export_err)?;
        }
    }
    state = state.next();
    trace!(sheet = %template.grid.name, ?state);

    // Carry over the template body above the data block (minus the rows the
    // captions and header just replaced). Value cells at or below data_start
    // are stale leftovers from a previous use of the template and are
    // dropped; formula cells are re-emitted wherever they live.
    for row in 0..data_start.min(template.grid.row_count()) {
        if row < CAPTION_ROWS || row == header_row {
            continue;
        }
        for col in 0..template.grid.col_count() {
            if !template.has_formula(row, col) {
                write_cell(worksheet, row, col, template.grid.cell(row, col))?;
            }
        }
    }
    for ((row, col), formula) in template.formulas() {
        write_formula(worksheet, *row, *col, formula)?;
    }
    state = state.next();
    trace!(sheet = %template.grid.name, ?state);

    // One output row per record, in original order. Formula-occupied
    // positions are never overwritten with data.
    for (offset, record) in records.iter().enumerate() {
        let row = data_start + offset;
        for spec in &layout.fields {
            if template.has_formula(row, spec.column) {
                continue;
            }
            if let Some(value) = record.get(&spec.target) {
                write_field(worksheet, row, spec.column, value)?;
            }
        }
    }
    state = state.next();
    trace!(sheet = %template.grid.name, ?state);

    Ok(state.next())
}

// Untargeted template sheets pass through with values and formulas intact.
fn copy_sheet(worksheet: &mut Worksheet, template: &TemplateSheet) -> RosterResult<()> {
    for row in 0..template.grid.row_count() {
        for col in 0..template.grid.col_count() {
            if !template.has_formula(row, col) {
                write_cell(worksheet, row, col, template.grid.cell(row, col))?;
            }
        }
    }
    for ((row, col), formula) in template.formulas() {
        write_formula(worksheet, *row, *col, formula)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    cell: &CellValue,
) -> RosterResult<()> {
    let (r, c) = (row as u32, col as u16);
    match cell {
        CellValue::Text(s) => {
            worksheet.write_string(r, c, s).map_err(export_err)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(r, c, *n).map_err(export_err)?;
        }
        CellValue::Date(d) => {
            worksheet
                .write_string(r, c, d.format("%Y-%m-%d").to_string())
                .map_err(export_err)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

fn write_field(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &FieldValue,
) -> RosterResult<()> {
    let (r, c) = (row as u32, col as u16);
    match value {
        FieldValue::Int(i) => {
            worksheet.write_number(r, c, *i as f64).map_err(export_err)?;
        }
        FieldValue::Float(f) => {
            worksheet.write_number(r, c, *f).map_err(export_err)?;
        }
        FieldValue::Text(s) => {
            worksheet.write_string(r, c, s).map_err(export_err)?;
        }
    }
    Ok(())
}

fn write_formula(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    formula: &str,
) -> RosterResult<()> {
    // calamine strips the leading '='; rust_xlsxwriter wants it back.
    let text = if formula.starts_with('=') {
        formula.to_string()
    } else {
        format!("={}", formula)
    };
    worksheet
        .write_formula(row as u32, col as u16, Formula::new(text))
        .map_err(export_err)?;
    Ok(())
}

fn export_err(e: XlsxError) -> RosterError {
    RosterError::Export(e.to_string())
}

/// Output document name: `{id}_{institution}_{formTag}_{isoDate}.xlsx`,
/// spaces collapsed to underscores.
pub fn export_file_name(
    institution_id: i64,
    institution_name: &str,
    form_tag: &str,
    date: NaiveDate,
) -> String {
    let name: String = institution_name
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!(
        "{}_{}_{}_{}.xlsx",
        institution_id,
        name,
        form_tag,
        date.format("%Y-%m-%d")
    )
}
