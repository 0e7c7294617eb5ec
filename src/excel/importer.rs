//! Whole-workbook import pipeline.
//!
//! Decode → per-sheet anchor resolution → drift probe → row extraction →
//! derived-field fill, accumulating non-fatal diagnostics as it goes. A bad
//! sheet never aborts the rest of the upload; only an unreadable container
//! is fatal.

use crate::config::RosterConfig;
use crate::core::{check_layout_drift, extract_rows, fill_derived, resolve_anchor, AnchorTier};
use crate::error::RosterResult;
use crate::excel::reader;
use crate::types::{
    Diagnostic, DomainRecord, FieldValue, ImportReport, SheetGrid, FIELD_INSTITUTION, FIELD_PERIOD,
};
use std::path::Path;
use tracing::debug;

/// Import a workbook file into coerced records plus diagnostics.
pub fn import_workbook(path: &Path, config: &RosterConfig) -> RosterResult<ImportReport> {
    let grids = reader::read_workbook(path)?;
    import_grids(grids, config)
}

/// Import an already-decoded workbook blob.
pub fn import_workbook_from_bytes(bytes: &[u8], config: &RosterConfig) -> RosterResult<ImportReport> {
    let grids = reader::read_workbook_from_bytes(bytes)?;
    import_grids(grids, config)
}

/// Run the per-sheet pipeline over decoded grids.
pub fn import_grids(grids: Vec<SheetGrid>, config: &RosterConfig) -> RosterResult<ImportReport> {
    let layout = config.layout()?;
    let ctx = config.coercion_context();
    let mut report = ImportReport::default();

    for grid in grids {
        report.sheets_read += 1;

        if grid.is_blank() {
            report.diagnostics.push(Diagnostic::EmptySheet {
                sheet: grid.name.clone(),
            });
            continue;
        }

        let anchor = resolve_anchor(&grid, &config.anchor);
        let data_start = anchor.data_start;
        debug!(sheet = %grid.name, data_start, tier = ?anchor.tier, "resolved data start");

        // Only a keyword-located anchor marks a real header row worth
        // probing (the matched row itself); a sentinel row carries no
        // captions.
        if anchor.tier == AnchorTier::HeaderKeyword {
            if let Some(detail) = check_layout_drift(&grid, data_start, layout) {
                report.diagnostics.push(Diagnostic::LayoutDrift {
                    sheet: grid.name.clone(),
                    detail,
                });
            }
        }

        let extraction = extract_rows(&grid, data_start, layout, &ctx);
        report.skipped_rows += extraction.skipped_rows;

        if extraction.records.is_empty() {
            report.diagnostics.push(Diagnostic::NoDataRows {
                sheet: grid.name.clone(),
            });
            continue;
        }

        debug!(
            sheet = %grid.name,
            records = extraction.records.len(),
            skipped = extraction.skipped_rows,
            "extracted sheet"
        );

        for mut record in extraction.records {
            fill_derived(&mut record, &layout.derived);
            report.records.push(record);
        }
    }

    Ok(report)
}

/// Attach the caller-owned aggregate key and reporting period to every
/// record of a batch.
pub fn attach_caller_context(records: &mut [DomainRecord], institution_id: i64, period: &str) {
    for record in records.iter_mut() {
        record.set(FIELD_INSTITUTION, FieldValue::Int(institution_id));
        record.set(FIELD_PERIOD, FieldValue::Text(period.to_string()));
    }
}
