//! Backend payload parsing
//!
//! The backend returns rows under several casings (`ID`, `id`, `createdAt`,
//! `CREATED_AT`, ...), ids as numbers or strings and timestamps in a few
//! formats. Everything is normalized here, once, into the canonical models.
//! A malformed row never fails the whole response: it is dropped or patched
//! with a conservative default and counted in a [`ParseReport`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::{
    Attendee, AttendeeId, AttendeePage, AttendeeQuery, AttendeeRecord, Conference, PageMeta,
    Registration, RegistrationStatus,
};
use crate::utils::errors::{Result, SourceError};
use crate::utils::helpers::{epoch, parse_timestamp, total_pages};

/// Counters for everything the parser had to drop or patch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub dropped_attendees: usize,
    pub dropped_conferences: usize,
    pub dropped_registrations: usize,
    pub coerced_statuses: usize,
    pub defaulted_fields: usize,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageEnvelope {
    Bare(Vec<Value>),
    Paged(WirePage),
}

#[derive(Debug, Deserialize)]
struct WirePage {
    #[serde(default, alias = "DATA", alias = "items")]
    data: Vec<Value>,
    #[serde(default, alias = "pagination", alias = "META")]
    meta: Option<WireMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMeta {
    #[serde(default)]
    page: Option<Value>,
    #[serde(default)]
    limit: Option<Value>,
    #[serde(default)]
    total: Option<Value>,
    #[serde(default, rename = "totalPages", alias = "total_pages")]
    total_pages: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogEnvelope {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(alias = "DATA")]
        data: Vec<Value>,
    },
}

#[derive(Debug, Deserialize)]
struct WireAttendee {
    #[serde(default, alias = "ID")]
    id: Option<Value>,
    #[serde(default, alias = "NAME", alias = "fullName", alias = "full_name")]
    name: Option<Value>,
    #[serde(default, alias = "EMAIL")]
    email: Option<Value>,
    #[serde(default, alias = "PHONE")]
    phone: Option<Value>,
    #[serde(default, alias = "COMPANY")]
    company: Option<Value>,
    #[serde(default, alias = "POSITION")]
    position: Option<Value>,
    #[serde(default, alias = "GENDER")]
    gender: Option<Value>,
    #[serde(default, rename = "avatarUrl", alias = "AVATAR_URL", alias = "avatar_url")]
    avatar_url: Option<Value>,
    #[serde(default, rename = "createdAt", alias = "CREATED_AT", alias = "created_at")]
    created_at: Option<Value>,
    #[serde(default, alias = "REGISTRATIONS")]
    registrations: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireConference {
    #[serde(default, alias = "ID")]
    id: Option<Value>,
    #[serde(default, alias = "NAME", alias = "title")]
    name: Option<Value>,
    #[serde(default, rename = "startDate", alias = "START_DATE", alias = "start_date")]
    start_date: Option<Value>,
    #[serde(default, rename = "endDate", alias = "END_DATE", alias = "end_date")]
    end_date: Option<Value>,
    #[serde(default, alias = "STATUS")]
    status: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireRegistration {
    #[serde(default, alias = "ID")]
    id: Option<Value>,
    #[serde(default, rename = "attendeeId", alias = "ATTENDEE_ID", alias = "attendee_id")]
    attendee_id: Option<Value>,
    #[serde(default, rename = "conferenceId", alias = "CONFERENCE_ID", alias = "conference_id")]
    conference_id: Option<Value>,
    #[serde(default, alias = "STATUS")]
    status: Option<Value>,
    #[serde(
        default,
        rename = "registrationDate",
        alias = "REGISTRATION_DATE",
        alias = "registration_date"
    )]
    registration_date: Option<Value>,
    #[serde(
        default,
        rename = "checkinTime",
        alias = "CHECKIN_TIME",
        alias = "checkin_time",
        alias = "checkInTime"
    )]
    checkin_time: Option<Value>,
    #[serde(
        default,
        rename = "checkoutTime",
        alias = "CHECKOUT_TIME",
        alias = "checkout_time",
        alias = "checkOutTime"
    )]
    checkout_time: Option<Value>,
}

/// Parse an attendee list response into one page of records
pub fn parse_attendee_page(body: Value, query: &AttendeeQuery) -> Result<(AttendeePage, ParseReport)> {
    let envelope: PageEnvelope =
        serde_json::from_value(body).map_err(|e| SourceError::InvalidResponse {
            source_name: "attendees".to_string(),
            message: e.to_string(),
        })?;

    let (rows, meta) = match envelope {
        PageEnvelope::Bare(rows) => (rows, None),
        PageEnvelope::Paged(page) => (page.data, page.meta),
    };

    let mut report = ParseReport::default();
    let records: Vec<AttendeeRecord> = rows
        .iter()
        .filter_map(|row| parse_attendee_record(row, &mut report))
        .collect();

    let meta = page_meta(meta, query, records.len());
    if !report.is_clean() {
        debug!(report = ?report, "Attendee page normalized with coercions");
    }

    Ok((AttendeePage { records, meta }, report))
}

/// Parse a conference catalog response (bare array or `{data: [...]}`)
pub fn parse_catalog(body: Value) -> Result<(Vec<Conference>, ParseReport)> {
    let envelope: CatalogEnvelope =
        serde_json::from_value(body).map_err(|e| SourceError::InvalidResponse {
            source_name: "conferences".to_string(),
            message: e.to_string(),
        })?;

    let rows = match envelope {
        CatalogEnvelope::Bare(rows) => rows,
        CatalogEnvelope::Wrapped { data } => data,
    };

    let mut report = ParseReport::default();
    let conferences = rows
        .iter()
        .filter_map(|row| parse_conference(row, &mut report))
        .collect();

    Ok((conferences, report))
}

/// Normalize one attendee row with its embedded registrations
pub fn parse_attendee_record(row: &Value, report: &mut ParseReport) -> Option<AttendeeRecord> {
    let wire: WireAttendee = match serde_json::from_value(row.clone()) {
        Ok(wire) => wire,
        Err(e) => {
            debug!(error = %e, "Dropping unreadable attendee row");
            report.dropped_attendees += 1;
            return None;
        }
    };

    let Some(id) = wire.id.as_ref().and_then(as_id) else {
        report.dropped_attendees += 1;
        return None;
    };

    let name = required_text(wire.name.as_ref(), report);
    let email = required_text(wire.email.as_ref(), report);
    let created_at = match wire.created_at.as_ref().and_then(as_timestamp) {
        Some(created_at) => created_at,
        None => {
            report.defaulted_fields += 1;
            epoch()
        }
    };

    let attendee = Attendee {
        id,
        name,
        email,
        phone: wire.phone.as_ref().and_then(as_text),
        company: wire.company.as_ref().and_then(as_text),
        position: wire.position.as_ref().and_then(as_text),
        gender: wire.gender.as_ref().and_then(as_text),
        avatar_url: wire.avatar_url.as_ref().and_then(as_text),
        created_at,
    };

    let registrations = match wire.registrations {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows
            .iter()
            .filter_map(|row| parse_registration(row, id, report))
            .collect(),
        Some(_) => {
            report.dropped_registrations += 1;
            Vec::new()
        }
    };

    Some(AttendeeRecord {
        attendee,
        registrations,
    })
}

/// Normalize one conference row
pub fn parse_conference(row: &Value, report: &mut ParseReport) -> Option<Conference> {
    let wire: WireConference = match serde_json::from_value(row.clone()) {
        Ok(wire) => wire,
        Err(_) => {
            report.dropped_conferences += 1;
            return None;
        }
    };

    let Some(id) = wire.id.as_ref().and_then(as_id) else {
        report.dropped_conferences += 1;
        return None;
    };

    let name = wire.name.as_ref().and_then(as_text).unwrap_or_else(|| {
        report.defaulted_fields += 1;
        format!("Conference {}", id)
    });

    Some(Conference {
        id,
        name,
        start_date: wire.start_date.as_ref().and_then(as_timestamp),
        end_date: wire.end_date.as_ref().and_then(as_timestamp),
        status: wire
            .status
            .as_ref()
            .and_then(as_text)
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

/// Normalize one registration embedded under attendee `owner`.
///
/// A registration without a conference id, or one that names a different
/// attendee, is treated as absent.
pub fn parse_registration(row: &Value, owner: AttendeeId, report: &mut ParseReport) -> Option<Registration> {
    let wire: WireRegistration = match serde_json::from_value(row.clone()) {
        Ok(wire) => wire,
        Err(_) => {
            report.dropped_registrations += 1;
            return None;
        }
    };

    let Some(conference_id) = wire.conference_id.as_ref().and_then(as_id) else {
        report.dropped_registrations += 1;
        return None;
    };

    let attendee_id = wire.attendee_id.as_ref().and_then(as_id).unwrap_or(owner);
    if attendee_id != owner {
        report.dropped_registrations += 1;
        return None;
    }

    let id = match wire.id.as_ref().and_then(as_id) {
        Some(id) => id,
        None => {
            report.defaulted_fields += 1;
            0
        }
    };

    let (status, status_coerced) = match wire.status.as_ref().and_then(as_text) {
        Some(raw) => RegistrationStatus::parse_or_registered(&raw),
        None => (RegistrationStatus::Registered, true),
    };
    if status_coerced {
        report.coerced_statuses += 1;
    }

    Some(Registration {
        id,
        attendee_id,
        conference_id,
        status,
        registration_date: wire.registration_date.as_ref().and_then(as_timestamp),
        checkin_time: wire.checkin_time.as_ref().and_then(as_timestamp),
        checkout_time: wire.checkout_time.as_ref().and_then(as_timestamp),
        status_coerced,
    })
}

fn page_meta(meta: Option<WireMeta>, query: &AttendeeQuery, rows: usize) -> PageMeta {
    let meta = meta.unwrap_or_default();
    let page = meta.page.as_ref().and_then(as_u32).unwrap_or(query.page);
    let limit = meta.limit.as_ref().and_then(as_u32).unwrap_or(query.limit);
    let total = meta
        .total
        .as_ref()
        .and_then(as_id)
        .and_then(|t| u64::try_from(t).ok())
        .unwrap_or(rows as u64);
    let total_pages = meta
        .total_pages
        .as_ref()
        .and_then(as_u32)
        .unwrap_or_else(|| total_pages(total, limit));

    PageMeta {
        page,
        limit,
        total,
        total_pages,
    }
}

fn required_text(value: Option<&Value>, report: &mut ParseReport) -> String {
    match value.and_then(as_text) {
        Some(text) => text,
        None => {
            report.defaulted_fields += 1;
            String::new()
        }
    }
}

/// Integer id from a JSON number or numeric string
fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    as_id(value).and_then(|n| u32::try_from(n).ok())
}

/// Non-empty text from a JSON string or number
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_upper_case_rows_are_normalized() {
        let body = json!({
            "data": [{
                "ID": 12,
                "NAME": "An Nguyen",
                "EMAIL": "an@example.com",
                "PHONE": null,
                "COMPANY": "Acme",
                "GENDER": "female",
                "CREATED_AT": "2024-10-25T08:00:00Z",
                "registrations": [{
                    "ID": 3,
                    "CONFERENCE_ID": 1,
                    "ATTENDEE_ID": 12,
                    "STATUS": "checked-in",
                    "CHECKIN_TIME": "2024-10-26 09:00:00"
                }]
            }],
            "meta": {"page": 1, "limit": 20, "total": 1, "totalPages": 1}
        });

        let (page, report) = parse_attendee_page(body, &AttendeeQuery::new(1, 20)).unwrap();
        assert!(report.is_clean());
        assert_eq!(page.len(), 1);

        let record = &page.records[0];
        assert_eq!(record.attendee.id, 12);
        assert_eq!(record.attendee.company.as_deref(), Some("Acme"));
        assert_eq!(record.attendee.phone, None);
        assert_eq!(record.registrations.len(), 1);
        assert_eq!(record.registrations[0].status, RegistrationStatus::CheckedIn);
        assert_eq!(
            record.registrations[0].checkin_time,
            Utc.with_ymd_and_hms(2024, 10, 26, 9, 0, 0).single()
        );
    }

    #[test]
    fn test_camel_case_rows_and_string_ids() {
        let body = json!({
            "data": [{
                "id": "7",
                "name": "Binh",
                "email": "binh@example.com",
                "createdAt": "2024-01-02",
                "registrations": [{"id": 1, "conferenceId": "4", "status": "Pending"}]
            }]
        });

        let (page, report) = parse_attendee_page(body, &AttendeeQuery::new(3, 10)).unwrap();
        assert!(report.is_clean());
        assert_eq!(page.records[0].attendee.id, 7);
        assert_eq!(page.records[0].registrations[0].conference_id, 4);
        assert_eq!(page.records[0].registrations[0].attendee_id, 7);
        assert_eq!(page.records[0].registrations[0].status, RegistrationStatus::Registered);
        assert_eq!(page.meta.page, 3);
        assert_eq!(page.meta.limit, 10);
        assert_eq!(page.meta.total, 1);
    }

    #[test]
    fn test_malformed_rows_are_counted_not_fatal() {
        let body = json!({
            "data": [
                {"name": "No Id", "email": "x@example.com"},
                {
                    "id": 2,
                    "name": "Chi",
                    "email": "chi@example.com",
                    "registrations": [
                        {"id": 1, "conferenceId": 1, "status": "teleported"},
                        {"id": 2, "status": "registered"},
                        {"id": 3, "conferenceId": 2, "attendeeId": 99, "status": "registered"}
                    ]
                }
            ]
        });

        let (page, report) = parse_attendee_page(body, &AttendeeQuery::new(1, 20)).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(report.dropped_attendees, 1);
        assert_eq!(report.dropped_registrations, 2);
        assert_eq!(report.coerced_statuses, 1);
        // missing createdAt
        assert_eq!(report.defaulted_fields, 1);

        let registrations = &page.records[0].registrations;
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].status, RegistrationStatus::Registered);
        assert!(registrations[0].status_coerced);
    }

    #[test]
    fn test_catalog_accepts_bare_and_wrapped() {
        let bare = json!([{"ID": 1, "NAME": "RustConf", "STATUS": "active", "START_DATE": "2024-11-01"}]);
        let (conferences, report) = parse_catalog(bare).unwrap();
        assert!(report.is_clean());
        assert_eq!(conferences[0].name, "RustConf");
        assert!(conferences[0].start_date.is_some());

        let wrapped = json!({"data": [{"id": 2, "name": "MedTech"}, {"name": "missing id"}]});
        let (conferences, report) = parse_catalog(wrapped).unwrap();
        assert_eq!(conferences.len(), 1);
        assert_eq!(conferences[0].status, "unknown");
        assert_eq!(report.dropped_conferences, 1);
    }

    #[test]
    fn test_unexpected_shape_is_invalid_response() {
        let result = parse_catalog(json!("oops"));
        assert!(matches!(
            result,
            Err(crate::utils::errors::ConsoleError::Source(SourceError::InvalidResponse { .. }))
        ));
    }
}
