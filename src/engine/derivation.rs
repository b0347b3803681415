//! Status derivation
//!
//! Combines one attendee, the conference catalog and the attendee's
//! registrations into an [`AttendeeView`]. Derivation is pure: the same inputs
//! always yield the same view.

use std::collections::HashMap;

use crate::models::{
    Attendee, AttendeeRecord, AttendeeView, ConferenceCatalog, ConferenceId, Registration,
    RegistrationStatus, ViewDiagnostics,
};

/// Aggregate per-conference statuses into one overall status.
///
/// The highest [`RegistrationStatus::precedence`] wins; an empty input yields
/// `NotRegistered`.
pub fn overall_status<I>(statuses: I) -> RegistrationStatus
where
    I: IntoIterator<Item = RegistrationStatus>,
{
    statuses
        .into_iter()
        .max_by_key(|status| status.precedence())
        .unwrap_or(RegistrationStatus::NotRegistered)
}

/// Keep one registration per conference, the most recently updated one.
///
/// Upstream should never send duplicates; this only guards against it.
/// Recency is the latest of checkout, checkin and registration time, ties
/// broken by the larger record id. Output keeps first-seen conference order.
/// Returns the kept registrations and how many were discarded.
pub fn dedupe_registrations<'a, I>(registrations: I) -> (Vec<Registration>, usize)
where
    I: IntoIterator<Item = &'a Registration>,
{
    let mut kept: Vec<Registration> = Vec::new();
    let mut by_conference: HashMap<ConferenceId, usize> = HashMap::new();
    let mut discarded = 0;

    for registration in registrations {
        match by_conference.get(&registration.conference_id) {
            Some(&slot) => {
                discarded += 1;
                if registration.recency_key() > kept[slot].recency_key() {
                    kept[slot] = registration.clone();
                }
            }
            None => {
                by_conference.insert(registration.conference_id, kept.len());
                kept.push(registration.clone());
            }
        }
    }

    (kept, discarded)
}

/// Derive the view for one attendee.
///
/// Only registrations whose `attendee_id` matches are considered. Conference
/// ids missing from the catalog are dropped from `conferences` and counted in
/// the diagnostics; they do not contribute to `overall_status`.
pub fn derive_view(
    attendee: &Attendee,
    catalog: &ConferenceCatalog,
    registrations: &[Registration],
) -> AttendeeView {
    let own: Vec<&Registration> = registrations
        .iter()
        .filter(|r| r.attendee_id == attendee.id)
        .collect();

    let (deduped, duplicate_registrations) = dedupe_registrations(own.iter().copied());

    let mut conferences = Vec::with_capacity(deduped.len());
    let mut resolved_statuses = Vec::with_capacity(deduped.len());
    let mut unresolved_conferences = 0;
    for registration in &deduped {
        match catalog.get(registration.conference_id) {
            Some(conference) => {
                conferences.push(conference.clone());
                resolved_statuses.push(registration.status);
            }
            None => unresolved_conferences += 1,
        }
    }

    let last_checkin_time = own.iter().filter_map(|r| r.checkin_time).max();
    let last_checkout_time = own.iter().filter_map(|r| r.checkout_time).max();
    let coerced_statuses = own.iter().filter(|r| r.status_coerced).count();

    AttendeeView {
        attendee: attendee.clone(),
        conferences,
        registrations: deduped,
        overall_status: overall_status(resolved_statuses),
        last_checkin_time,
        last_checkout_time,
        diagnostics: ViewDiagnostics {
            unresolved_conferences,
            duplicate_registrations,
            coerced_statuses,
        },
    }
}

/// Derive views for every record on a page, preserving page order
pub fn derive_views(records: &[AttendeeRecord], catalog: &ConferenceCatalog) -> Vec<AttendeeView> {
    records
        .iter()
        .map(|record| derive_view(&record.attendee, catalog, &record.registrations))
        .collect()
}
