//! Roster sorting
//!
//! String keys sort ascending on a case-folded key, `created_at` sorts newest
//! first. All sorts are stable.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::AttendeeView;
use crate::utils::errors::ConsoleError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    Company,
    Email,
    CreatedAt,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Company => "company",
            SortKey::Email => "email",
            SortKey::CreatedAt => "createdAt",
        }
    }

    /// Compare two views under this key
    pub fn compare(&self, a: &AttendeeView, b: &AttendeeView) -> Ordering {
        match self {
            SortKey::Name => compare_text(&a.attendee.name, &b.attendee.name),
            SortKey::Email => compare_text(&a.attendee.email, &b.attendee.email),
            SortKey::Company => compare_text(
                a.attendee.company.as_deref().unwrap_or(""),
                b.attendee.company.as_deref().unwrap_or(""),
            ),
            SortKey::CreatedAt => b.attendee.created_at.cmp(&a.attendee.created_at),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "").as_str() {
            "name" => Ok(SortKey::Name),
            "company" => Ok(SortKey::Company),
            "email" => Ok(SortKey::Email),
            "createdat" => Ok(SortKey::CreatedAt),
            other => Err(ConsoleError::InvalidInput(format!(
                "Unknown sort key: {}",
                other
            ))),
        }
    }
}

/// Case-folded comparison, raw string as tie-breaker so the order is total
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort views by `key`; equal keys keep their input order
pub fn sort(mut views: Vec<AttendeeView>, key: SortKey) -> Vec<AttendeeView> {
    views.sort_by(|a, b| key.compare(a, b));
    views
}
