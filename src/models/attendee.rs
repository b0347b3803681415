//! Attendee model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::registration::Registration;

pub type AttendeeId = i64;

/// A person record, independent of any specific conference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: AttendeeId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An attendee row together with the registrations embedded in the same response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRecord {
    pub attendee: Attendee,
    pub registrations: Vec<Registration>,
}

/// Server-side paging and filtering parameters for the attendee source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeQuery {
    pub page: u32,
    pub limit: u32,
    /// Free text matched by the backend against name, email and company
    pub search: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
}

impl AttendeeQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            search: None,
            name: None,
            gender: None,
        }
    }

    /// Query parameters as sent to the backend
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        if let Some(ref name) = self.name {
            params.push(("name", name.clone()));
        }
        if let Some(ref gender) = self.gender {
            params.push(("gender", gender.clone()));
        }
        params
    }
}

/// Paging metadata reported by the attendee source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// One page of attendee rows as fetched from the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeePage {
    pub records: Vec<AttendeeRecord>,
    pub meta: PageMeta,
}

impl AttendeePage {
    pub fn empty(query: &AttendeeQuery) -> Self {
        Self {
            records: Vec::new(),
            meta: PageMeta {
                page: query.page,
                limit: query.limit,
                total: 0,
                total_pages: 0,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
