//! Conference model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ConferenceId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub id: ConferenceId,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
}

/// Snapshot of the full conference catalog, indexed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConferenceCatalog {
    conferences: Vec<Conference>,
    index: HashMap<ConferenceId, usize>,
}

impl ConferenceCatalog {
    /// Build a catalog; a later duplicate id replaces the earlier entry
    pub fn new(conferences: Vec<Conference>) -> Self {
        let mut unique: Vec<Conference> = Vec::with_capacity(conferences.len());
        let mut index = HashMap::with_capacity(conferences.len());

        for conference in conferences {
            match index.get(&conference.id) {
                Some(&position) => unique[position] = conference,
                None => {
                    index.insert(conference.id, unique.len());
                    unique.push(conference);
                }
            }
        }

        Self {
            conferences: unique,
            index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ConferenceId) -> Option<&Conference> {
        self.index.get(&id).and_then(|&i| self.conferences.get(i))
    }

    pub fn contains(&self, id: ConferenceId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conference> {
        self.conferences.iter()
    }

    pub fn len(&self) -> usize {
        self.conferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conferences.is_empty()
    }
}
