//! Derived attendee view
//!
//! An `AttendeeView` is rebuilt from an attendee plus the current conference
//! and registration snapshots. It is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attendee::{Attendee, AttendeeId};
use super::conference::{Conference, ConferenceId};
use super::registration::{Registration, RegistrationStatus};

/// Data-quality counters collected while deriving one view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDiagnostics {
    /// Registrations whose conference id is not in the catalog
    pub unresolved_conferences: usize,
    /// Registrations dropped because a newer one exists for the same conference
    pub duplicate_registrations: usize,
    /// Registrations whose status was replaced by `registered`
    pub coerced_statuses: usize,
}

impl ViewDiagnostics {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    pub fn merge(&mut self, other: &ViewDiagnostics) {
        self.unresolved_conferences += other.unresolved_conferences;
        self.duplicate_registrations += other.duplicate_registrations;
        self.coerced_statuses += other.coerced_statuses;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeView {
    pub attendee: Attendee,
    pub conferences: Vec<Conference>,
    pub registrations: Vec<Registration>,
    pub overall_status: RegistrationStatus,
    pub last_checkin_time: Option<DateTime<Utc>>,
    pub last_checkout_time: Option<DateTime<Utc>>,
    pub diagnostics: ViewDiagnostics,
}

impl AttendeeView {
    pub fn id(&self) -> AttendeeId {
        self.attendee.id
    }

    /// Whether the attendee belongs to the given (resolved) conference
    pub fn attends(&self, conference_id: ConferenceId) -> bool {
        self.conferences.iter().any(|c| c.id == conference_id)
    }

    pub fn conference_names(&self) -> Vec<&str> {
        self.conferences.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Summary counts over a set of views
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStats {
    pub total: usize,
    pub by_status: BTreeMap<RegistrationStatus, usize>,
    pub diagnostics: ViewDiagnostics,
}

impl RosterStats {
    pub fn from_views(views: &[AttendeeView]) -> Self {
        let mut stats = Self {
            total: views.len(),
            ..Self::default()
        };
        for view in views {
            *stats.by_status.entry(view.overall_status).or_insert(0) += 1;
            stats.diagnostics.merge(&view.diagnostics);
        }
        stats
    }

    pub fn count(&self, status: RegistrationStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
