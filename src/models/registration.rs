//! Registration model
//!
//! A registration links one attendee to one conference and carries its
//! lifecycle state. Absence of a registration means "not registered".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::attendee::AttendeeId;
use super::conference::ConferenceId;

pub type RegistrationId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationStatus {
    NotRegistered,
    Registered,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 6] = [
        RegistrationStatus::NotRegistered,
        RegistrationStatus::Registered,
        RegistrationStatus::CheckedIn,
        RegistrationStatus::CheckedOut,
        RegistrationStatus::Cancelled,
        RegistrationStatus::NoShow,
    ];

    /// Rank used to aggregate statuses across conferences; higher wins.
    ///
    /// Terminal and administrative states outrank presence, and presence
    /// outranks a passive registration.
    pub fn precedence(self) -> u8 {
        match self {
            RegistrationStatus::Cancelled => 5,
            RegistrationStatus::NoShow => 4,
            RegistrationStatus::CheckedOut => 3,
            RegistrationStatus::CheckedIn => 2,
            RegistrationStatus::Registered => 1,
            RegistrationStatus::NotRegistered => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStatus::NotRegistered => "not-registered",
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::CheckedIn => "checked-in",
            RegistrationStatus::CheckedOut => "checked-out",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::NoShow => "no-show",
        }
    }

    /// Human-readable label used in exports
    pub fn label(self) -> &'static str {
        match self {
            RegistrationStatus::NotRegistered => "Not registered",
            RegistrationStatus::Registered => "Registered",
            RegistrationStatus::CheckedIn => "Checked in",
            RegistrationStatus::CheckedOut => "Checked out",
            RegistrationStatus::Cancelled => "Cancelled",
            RegistrationStatus::NoShow => "No-show",
        }
    }

    /// Parse a backend status string.
    ///
    /// Matching ignores case and accepts `_` or spaces in place of `-`.
    /// `pending` is the backend's name for a registration awaiting approval.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "not-registered" => Some(RegistrationStatus::NotRegistered),
            "registered" | "pending" => Some(RegistrationStatus::Registered),
            "checked-in" | "checkedin" => Some(RegistrationStatus::CheckedIn),
            "checked-out" | "checkedout" => Some(RegistrationStatus::CheckedOut),
            "cancelled" | "canceled" => Some(RegistrationStatus::Cancelled),
            "no-show" | "noshow" => Some(RegistrationStatus::NoShow),
            _ => None,
        }
    }

    /// Parse leniently, falling back to `Registered` for unknown values.
    ///
    /// The second element is `true` when the fallback was used.
    pub fn parse_or_registered(raw: &str) -> (Self, bool) {
        match Self::parse(raw) {
            Some(status) => (status, false),
            None => (RegistrationStatus::Registered, true),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = crate::utils::errors::ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            crate::utils::errors::ConsoleError::InvalidInput(format!(
                "Unknown registration status: {}",
                s
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub attendee_id: AttendeeId,
    pub conference_id: ConferenceId,
    pub status: RegistrationStatus,
    pub registration_date: Option<DateTime<Utc>>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub checkout_time: Option<DateTime<Utc>>,
    /// Set when the backend status was unrecognised and replaced by `Registered`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub status_coerced: bool,
}

impl Registration {
    /// Most recent timestamp recorded on this registration
    pub fn latest_activity(&self) -> Option<DateTime<Utc>> {
        [self.checkout_time, self.checkin_time, self.registration_date]
            .into_iter()
            .flatten()
            .max()
    }

    /// Ordering key for "most recently updated": latest activity, then record id
    pub fn recency_key(&self) -> (Option<DateTime<Utc>>, RegistrationId) {
        (self.latest_activity(), self.id)
    }
}
