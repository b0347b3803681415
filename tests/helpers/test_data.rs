//! Test data helpers for creating roster fixtures

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use confdesk::config::Settings;
use confdesk::models::{Attendee, AttendeeRecord, Conference, Registration, RegistrationStatus};
use confdesk::services::{StaticAttendeeSource, StaticConferenceSource};
use confdesk::RosterPipeline;

pub type StaticPipeline = RosterPipeline<StaticAttendeeSource, StaticConferenceSource>;

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, day, hour, 0, 0).unwrap()
}

/// Helper function to create a test attendee
pub fn create_test_attendee(id: i64, name: &str, email: &str) -> Attendee {
    Attendee {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        company: None,
        position: None,
        gender: None,
        avatar_url: None,
        created_at: ts(1, 0) + chrono::Duration::hours(id),
    }
}

pub fn create_test_conference(id: i64, name: &str) -> Conference {
    Conference {
        id,
        name: name.to_string(),
        start_date: Some(ts(24, 8)),
        end_date: Some(ts(26, 18)),
        status: "active".to_string(),
    }
}

pub fn create_test_registration(
    id: i64,
    attendee_id: i64,
    conference_id: i64,
    status: RegistrationStatus,
) -> Registration {
    Registration {
        id,
        attendee_id,
        conference_id,
        status,
        registration_date: Some(ts(1, 9)),
        checkin_time: None,
        checkout_time: None,
        status_coerced: false,
    }
}

pub fn create_test_record(attendee: Attendee, registrations: Vec<Registration>) -> AttendeeRecord {
    AttendeeRecord {
        attendee,
        registrations,
    }
}

/// Two conferences: 1 "RustConf", 2 "DataSummit"
pub fn test_catalog() -> Vec<Conference> {
    vec![
        create_test_conference(1, "RustConf"),
        create_test_conference(2, "DataSummit"),
    ]
}

/// Roster used by the pipeline scenarios.
///
/// - 1 An Nguyen: conf1 registered, conf2 checked-in
/// - 2 Bob Tran (anna@x.com): conf2 registered
/// - 3 Carol Le: no registrations
/// - 4 Dana Pham: conf1 cancelled
pub fn test_roster() -> Vec<AttendeeRecord> {
    let mut an = create_test_attendee(1, "An Nguyen", "an.nguyen@example.com");
    an.gender = Some("female".to_string());
    an.company = Some("Acme".to_string());
    let mut checked_in = create_test_registration(11, 1, 2, RegistrationStatus::CheckedIn);
    checked_in.checkin_time = Some(ts(24, 9));

    let mut bob = create_test_attendee(2, "Bob Tran", "anna@x.com");
    bob.gender = Some("male".to_string());

    let mut carol = create_test_attendee(3, "Carol Le", "carol@example.com");
    carol.gender = Some("female".to_string());

    let dana = create_test_attendee(4, "Dana Pham", "dana@example.com");

    vec![
        create_test_record(
            an,
            vec![
                create_test_registration(10, 1, 1, RegistrationStatus::Registered),
                checked_in,
            ],
        ),
        create_test_record(
            bob,
            vec![create_test_registration(20, 2, 2, RegistrationStatus::Registered)],
        ),
        create_test_record(carol, Vec::new()),
        create_test_record(
            dana,
            vec![create_test_registration(40, 4, 1, RegistrationStatus::Cancelled)],
        ),
    ]
}

pub fn static_pipeline(
    records: Vec<AttendeeRecord>,
    conferences: Vec<Conference>,
) -> (StaticPipeline, StaticAttendeeSource, StaticConferenceSource) {
    let attendees = StaticAttendeeSource::new(records);
    let catalog = StaticConferenceSource::new(conferences);
    let pipeline = RosterPipeline::new(attendees.clone(), catalog.clone(), &Settings::default());
    (pipeline, attendees, catalog)
}

/// Settings pointing at a mock backend, with fast retries and no spacing
pub fn test_settings(base_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = base_url.to_string();
    settings.api.timeout_seconds = 5;
    settings.api.retry_base_delay_ms = 10;
    settings.api.min_request_interval_ms = 0;
    settings
}

/// Attendee page as the backend returns it, mixing field casings
pub fn attendee_page_json() -> Value {
    json!({
        "data": [
            {
                "ID": 1,
                "NAME": "An Nguyen",
                "EMAIL": "an.nguyen@example.com",
                "GENDER": "female",
                "COMPANY": "Acme",
                "CREATED_AT": "2024-10-01 08:00:00",
                "registrations": [
                    { "ID": 10, "CONFERENCE_ID": 1, "STATUS": "registered" },
                    { "id": 11, "conferenceId": "2", "status": "checked_in",
                      "checkinTime": "2024-10-24T09:00:00Z" }
                ]
            },
            {
                "id": "2",
                "name": "Bob Tran",
                "email": "anna@x.com",
                "gender": "male",
                "createdAt": "2024-10-02T08:00:00Z",
                "registrations": [
                    { "id": 20, "conference_id": 2, "status": "pending" },
                    { "id": 21, "conference_id": 1, "status": "teleported" },
                    { "id": 22, "status": "registered" }
                ]
            },
            { "name": "No Id" }
        ],
        "meta": { "page": 1, "limit": 20, "total": 2, "totalPages": 1 }
    })
}

pub fn catalog_json() -> Value {
    json!([
        { "ID": 1, "NAME": "RustConf", "STATUS": "active", "START_DATE": "2024-10-24" },
        { "id": 2, "name": "DataSummit", "status": "active" }
    ])
}
