//! Pure pipeline stages: anchor resolution, coercion, extraction,
//! derived-field computation and partitioning.

pub mod anchor;
pub mod coerce;
pub mod derived;
pub mod extract;
pub mod partition;

pub use anchor::{locate_data_start, resolve_anchor, AnchorResolution, AnchorTier};
pub use coerce::{coerce, CoercionContext, CoercionRule};
pub use derived::fill_derived;
pub use extract::{check_layout_drift, extract_row, extract_rows, Extraction};
pub use partition::partition_by_group;
