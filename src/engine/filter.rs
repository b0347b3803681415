//! Roster filtering
//!
//! A [`FilterCriteria`] is a conjunction of optional predicates applied to the
//! views currently materialized. Filtering never reorders its input.

use serde::{Deserialize, Serialize};

use crate::models::{AttendeeView, ConferenceId, RegistrationStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-insensitive substring of name, email or company
    pub text: Option<String>,
    /// Exact, case-sensitive gender value
    pub gender: Option<String>,
    pub conference_id: Option<ConferenceId>,
    pub overall_status: Option<RegistrationStatus>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_conference(mut self, conference_id: ConferenceId) -> Self {
        self.conference_id = Some(conference_id);
        self
    }

    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.overall_status = Some(status);
        self
    }

    /// Search text, if any non-empty text was supplied
    pub fn search_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// True when no criterion is set and filtering is the identity
    pub fn is_empty(&self) -> bool {
        self.search_text().is_none()
            && self.gender.is_none()
            && self.conference_id.is_none()
            && self.overall_status.is_none()
    }

    /// Check every supplied criterion against one view
    pub fn matches(&self, view: &AttendeeView) -> bool {
        self.matches_text(view)
            && self.matches_gender(view)
            && self.matches_conference(view)
            && self.matches_status(view)
    }

    fn matches_text(&self, view: &AttendeeView) -> bool {
        let Some(text) = self.search_text() else {
            return true;
        };
        let needle = text.to_lowercase();
        let attendee = &view.attendee;

        attendee.name.to_lowercase().contains(&needle)
            || attendee.email.to_lowercase().contains(&needle)
            || attendee
                .company
                .as_deref()
                .is_some_and(|company| company.to_lowercase().contains(&needle))
    }

    fn matches_gender(&self, view: &AttendeeView) -> bool {
        match self.gender {
            Some(ref gender) => view.attendee.gender.as_deref() == Some(gender.as_str()),
            None => true,
        }
    }

    fn matches_conference(&self, view: &AttendeeView) -> bool {
        self.conference_id.map_or(true, |id| view.attends(id))
    }

    fn matches_status(&self, view: &AttendeeView) -> bool {
        self.overall_status
            .map_or(true, |status| view.overall_status == status)
    }
}

/// Keep the views matching all supplied criteria, in input order
pub fn filter(views: &[AttendeeView], criteria: &FilterCriteria) -> Vec<AttendeeView> {
    if criteria.is_empty() {
        return views.to_vec();
    }
    views
        .iter()
        .filter(|view| criteria.matches(view))
        .cloned()
        .collect()
}
