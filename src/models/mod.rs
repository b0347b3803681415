//! Data models module
//!
//! Canonical shapes used by the derivation, filter and sort engines. Raw
//! backend payloads are normalized into these types in `services::payload`.

pub mod attendee;
pub mod conference;
pub mod registration;
pub mod view;

// Re-export commonly used models
pub use attendee::{Attendee, AttendeeId, AttendeePage, AttendeeQuery, AttendeeRecord, PageMeta};
pub use conference::{Conference, ConferenceCatalog, ConferenceId};
pub use registration::{Registration, RegistrationId, RegistrationStatus};
pub use view::{AttendeeView, RosterStats, ViewDiagnostics};
