//! Rosterbook - bulk roster exchange between spreadsheets and a reporting store
//!
//! This library imports human-maintained roster workbooks (anchor detection,
//! total type coercion, derived totals) into batched record submissions, and
//! exports stored records back into pre-formatted reporting templates without
//! disturbing template-authored formulas.
//!
//! # Example
//!
//! ```no_run
//! use rosterbook::config::RosterConfig;
//! use rosterbook::excel::import_workbook;
//! use std::path::Path;
//!
//! let config = RosterConfig::default();
//! let report = import_workbook(Path::new("roster.xlsx"), &config)?;
//!
//! println!("Records: {}", report.records.len());
//! for diagnostic in &report.diagnostics {
//!     println!("note: {}", diagnostic);
//! }
//! # Ok::<(), rosterbook::error::RosterError>(())
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod layout;
pub mod types;

// Re-export commonly used types
pub use error::{RosterError, RosterResult};
pub use types::{CellValue, Diagnostic, DomainRecord, FieldValue, SheetGrid};
