//! Data-start resolution for loosely structured sheets.
//!
//! Three fixed tiers, in priority order: the explicit sentinel marker, the
//! header-keyword heuristic over the first few rows, and a default of 0.
//! Resolution never fails.

use crate::config::AnchorConfig;
use crate::types::{CellValue, SheetGrid};

/// Which tier produced the data-start row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTier {
    Sentinel,
    /// The matched keyword row is the data-start row itself, and it is the
    /// row the layout-drift probe inspects.
    HeaderKeyword,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorResolution {
    pub data_start: usize,
    pub tier: AnchorTier,
}

/// First data row of a sheet.
///
/// A sentinel anywhere in the sheet wins outright: at row `k` it yields
/// `k + 1`, regardless of keyword matches anywhere else. Absent a sentinel,
/// the first row within `scan_rows` containing a header keyword is the
/// data-start row itself. Absent both, 0.
pub fn resolve_anchor(grid: &SheetGrid, config: &AnchorConfig) -> AnchorResolution {
    for row in 0..grid.row_count() {
        if row_has_sentinel(grid, row, &config.sentinel) {
            return AnchorResolution {
                data_start: row + 1,
                tier: AnchorTier::Sentinel,
            };
        }
    }

    // Only the keyword fallback is window-bounded.
    for row in 0..grid.row_count().min(config.scan_rows) {
        if row_has_keyword(grid, row, &config.keywords) {
            return AnchorResolution {
                data_start: row,
                tier: AnchorTier::HeaderKeyword,
            };
        }
    }

    AnchorResolution {
        data_start: 0,
        tier: AnchorTier::Default,
    }
}

/// Data-start row index alone; never fails, always zero-or-positive.
pub fn locate_data_start(grid: &SheetGrid, config: &AnchorConfig) -> usize {
    resolve_anchor(grid, config).data_start
}

fn row_has_sentinel(grid: &SheetGrid, row: usize, sentinel: &str) -> bool {
    cells_of(grid, row).any(|text| text.trim() == sentinel)
}

fn row_has_keyword(grid: &SheetGrid, row: usize, keywords: &[String]) -> bool {
    cells_of(grid, row).any(|text| {
        let lower = text.to_lowercase();
        keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()))
    })
}

// Markers and headers live only in text cells. cell() is total, so probing
// a generous fixed width covers ragged rows.
const MAX_SCAN_COLS: usize = 64;

fn cells_of<'a>(grid: &'a SheetGrid, row: usize) -> impl Iterator<Item = &'a str> {
    (0..MAX_SCAN_COLS).filter_map(move |col| match grid.cell(row, col) {
        CellValue::Text(s) => Some(s.as_str()),
        _ => None,
    })
}
