//! Roster engine
//!
//! Pure functions over canonical models: status derivation, filtering,
//! sorting, selection and export. Nothing here performs I/O except
//! `ExportFile::write_to`.

pub mod derivation;
pub mod export;
pub mod filter;
pub mod selection;
pub mod sort;

pub use derivation::{dedupe_registrations, derive_view, derive_views, overall_status};
pub use export::{
    export, export_filename, export_rows, ExportFile, ExportFormat, ExportOutcome, ExportRow,
    EXPORT_COLUMNS,
};
pub use filter::{filter, FilterCriteria};
pub use selection::Selection;
pub use sort::{sort, SortKey};
