//! State management module
//!
//! The roster pipeline, its memoized view selector and the event store that
//! connects it to change notifications.

pub mod pipeline;
pub mod selector;
pub mod store;

// Re-export commonly used state components
pub use pipeline::{RefreshOutcome, RosterPipeline};
pub use selector::{SnapshotRevisions, ViewSelector};
pub use store::{ChangeCause, RosterEvent, RosterStore};
