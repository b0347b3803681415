//! Services module
//!
//! Data sources feeding the roster pipeline and the parsing layer at their
//! boundary.

pub mod attendees;
pub mod client;
pub mod conferences;
pub mod memory;
pub mod payload;

// Re-export commonly used services
pub use attendees::{AttendeeSource, FetchedPage, HttpAttendeeSource};
pub use client::ApiClient;
pub use conferences::{ConferenceSource, FetchedCatalog, HttpConferenceSource};
pub use memory::{StaticAttendeeSource, StaticConferenceSource};
pub use payload::ParseReport;

use crate::config::settings::Settings;
use crate::utils::errors::Result;

/// Factory for the HTTP-backed sources
#[derive(Clone, Debug)]
pub struct SourceFactory {
    pub attendees: HttpAttendeeSource,
    pub conferences: HttpConferenceSource,
}

impl SourceFactory {
    /// Create both sources from the API settings.
    ///
    /// Each source gets its own client so request spacing is tracked per source.
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            attendees: HttpAttendeeSource::new(&settings.api)?,
            conferences: HttpConferenceSource::new(&settings.api)?,
        })
    }

    pub fn into_parts(self) -> (HttpAttendeeSource, HttpConferenceSource) {
        (self.attendees, self.conferences)
    }
}
