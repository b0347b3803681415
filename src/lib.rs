//! ConfDesk roster engine
//!
//! Aggregates attendees, the conference catalog and per-conference
//! registrations into one derived view per attendee, and provides search,
//! filtering, sorting, selection and export over the currently loaded page.

pub mod config;
pub mod engine;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ConsoleError, Result, SourceError};

// Re-export main components for easy access
pub use engine::{ExportFormat, ExportOutcome, FilterCriteria, Selection, SortKey};
pub use models::{AttendeeView, RegistrationStatus};
pub use services::SourceFactory;
pub use state::{ChangeCause, RefreshOutcome, RosterPipeline, RosterStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
