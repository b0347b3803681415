//! In-memory sources
//!
//! Sources that serve fixed data, used for demos and tests. They apply the
//! same server-side search, name and gender filtering and paging contract as
//! the backend, and can be told to fail or to answer slowly.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::attendees::{AttendeeSource, FetchedPage};
use super::conferences::{ConferenceSource, FetchedCatalog};
use super::payload::ParseReport;
use crate::models::{AttendeePage, AttendeeQuery, AttendeeRecord, Conference, ConferenceCatalog, PageMeta};
use crate::utils::errors::{Result, SourceError};
use crate::utils::helpers::total_pages;

#[derive(Debug, Default)]
struct Behaviour {
    fail: bool,
    delays: VecDeque<Duration>,
    calls: usize,
}

impl Behaviour {
    /// Record a call and return the delay and failure flag to apply
    fn begin_call(&mut self) -> (Option<Duration>, bool) {
        self.calls += 1;
        (self.delays.pop_front(), self.fail)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct AttendeeData {
    records: Vec<AttendeeRecord>,
    behaviour: Behaviour,
}

/// Attendee source serving a fixed set of records
#[derive(Clone, Debug, Default)]
pub struct StaticAttendeeSource {
    inner: Arc<Mutex<AttendeeData>>,
}

impl StaticAttendeeSource {
    pub fn new(records: Vec<AttendeeRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AttendeeData {
                records,
                behaviour: Behaviour::default(),
            })),
        }
    }

    /// Replace the served records (simulates a backend-side change)
    pub fn set_records(&self, records: Vec<AttendeeRecord>) {
        lock(&self.inner).records = records;
    }

    pub fn set_failing(&self, fail: bool) {
        lock(&self.inner).behaviour.fail = fail;
    }

    /// Delay the next call by `delay`; queued delays apply in call order
    pub fn push_delay(&self, delay: Duration) {
        lock(&self.inner).behaviour.delays.push_back(delay);
    }

    pub fn calls(&self) -> usize {
        lock(&self.inner).behaviour.calls
    }
}

#[async_trait]
impl AttendeeSource for StaticAttendeeSource {
    async fn fetch_page(&self, query: &AttendeeQuery) -> Result<FetchedPage> {
        let (delay, fail) = lock(&self.inner).behaviour.begin_call();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(SourceError::Unavailable {
                source_name: "attendees".to_string(),
                message: "static source configured to fail".to_string(),
            }
            .into());
        }

        let data = lock(&self.inner);
        let matching: Vec<&AttendeeRecord> = data
            .records
            .iter()
            .filter(|record| matches_server_filters(record, query))
            .collect();

        let total = matching.len() as u64;
        let limit = query.limit.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1) * limit;
        let records = matching.into_iter().skip(skip).take(limit).cloned().collect();

        Ok(FetchedPage {
            page: AttendeePage {
                records,
                meta: PageMeta {
                    page: query.page,
                    limit: query.limit,
                    total,
                    total_pages: total_pages(total, query.limit),
                },
            },
            report: ParseReport::default(),
        })
    }
}

/// Backend-side filtering: free-text search over name, email and company,
/// name substring (both case-insensitive) and exact gender
fn matches_server_filters(record: &AttendeeRecord, query: &AttendeeQuery) -> bool {
    let attendee = &record.attendee;
    let search_ok = query.search.as_ref().map_or(true, |text| {
        let needle = text.to_lowercase();
        [
            Some(attendee.name.as_str()),
            Some(attendee.email.as_str()),
            attendee.company.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    });
    let name_ok = query.name.as_ref().map_or(true, |name| {
        record
            .attendee
            .name
            .to_lowercase()
            .contains(&name.to_lowercase())
    });
    let gender_ok = query
        .gender
        .as_ref()
        .map_or(true, |gender| record.attendee.gender.as_deref() == Some(gender.as_str()));
    search_ok && name_ok && gender_ok
}

#[derive(Debug, Default)]
struct ConferenceData {
    conferences: Vec<Conference>,
    behaviour: Behaviour,
}

/// Conference source serving a fixed catalog
#[derive(Clone, Debug, Default)]
pub struct StaticConferenceSource {
    inner: Arc<Mutex<ConferenceData>>,
}

impl StaticConferenceSource {
    pub fn new(conferences: Vec<Conference>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConferenceData {
                conferences,
                behaviour: Behaviour::default(),
            })),
        }
    }

    pub fn set_conferences(&self, conferences: Vec<Conference>) {
        lock(&self.inner).conferences = conferences;
    }

    pub fn set_failing(&self, fail: bool) {
        lock(&self.inner).behaviour.fail = fail;
    }

    pub fn push_delay(&self, delay: Duration) {
        lock(&self.inner).behaviour.delays.push_back(delay);
    }

    pub fn calls(&self) -> usize {
        lock(&self.inner).behaviour.calls
    }
}

#[async_trait]
impl ConferenceSource for StaticConferenceSource {
    async fn fetch_catalog(&self) -> Result<FetchedCatalog> {
        let (delay, fail) = lock(&self.inner).behaviour.begin_call();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(SourceError::Unavailable {
                source_name: "conferences".to_string(),
                message: "static source configured to fail".to_string(),
            }
            .into());
        }

        let conferences = lock(&self.inner).conferences.clone();
        Ok(FetchedCatalog {
            catalog: ConferenceCatalog::new(conferences),
            report: ParseReport::default(),
        })
    }
}
