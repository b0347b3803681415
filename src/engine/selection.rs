//! Bulk selection over the visible roster

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{AttendeeId, AttendeeView};

/// A set of selected attendee ids.
///
/// Bulk operations take the currently visible (filtered and sorted) views, so
/// `select_all` never reaches ids outside the visible set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: BTreeSet<AttendeeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: AttendeeId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select(&mut self, id: AttendeeId) {
        self.ids.insert(id);
    }

    /// Select exactly the visible views, replacing any previous selection
    pub fn select_all(&mut self, visible: &[AttendeeView]) {
        self.ids = visible.iter().map(AttendeeView::id).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: AttendeeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = AttendeeId> + '_ {
        self.ids.iter().copied()
    }

    /// Drop ids that are no longer visible; returns how many were dropped
    pub fn retain_visible(&mut self, visible: &[AttendeeView]) -> usize {
        let visible: BTreeSet<AttendeeId> = visible.iter().map(AttendeeView::id).collect();
        let before = self.ids.len();
        self.ids.retain(|id| visible.contains(id));
        before - self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendee, RegistrationStatus};
    use chrono::Utc;

    fn view(id: i64) -> AttendeeView {
        AttendeeView {
            attendee: Attendee {
                id,
                name: format!("Attendee {}", id),
                email: String::new(),
                phone: None,
                company: None,
                position: None,
                gender: None,
                avatar_url: None,
                created_at: Utc::now(),
            },
            conferences: Vec::new(),
            registrations: Vec::new(),
            overall_status: RegistrationStatus::NotRegistered,
            last_checkin_time: None,
            last_checkout_time: None,
            diagnostics: Default::default(),
        }
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle(7));
        assert!(selection.contains(7));
        assert!(!selection.toggle(7));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_is_scoped_to_visible_views() {
        let mut selection = Selection::new();
        selection.select(99);
        selection.select_all(&[view(3), view(1)]);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!selection.contains(99));
    }

    #[test]
    fn test_retain_visible() {
        let mut selection = Selection::new();
        for id in [1, 2, 3] {
            selection.select(id);
        }
        assert_eq!(selection.retain_visible(&[view(2)]), 2);
        assert_eq!(selection.len(), 1);

        selection.clear();
        assert!(selection.is_empty());
    }
}
