//! Spreadsheet I/O: workbook decoding, the import pipeline and the
//! template-driven export composer.

pub mod composer;
pub mod importer;
pub mod reader;

pub use composer::{export_file_name, SheetState, TemplateComposer};
pub use importer::{
    attach_caller_context, import_grids, import_workbook, import_workbook_from_bytes,
};
pub use reader::{read_template, read_workbook, read_workbook_from_bytes, TemplateSheet};
