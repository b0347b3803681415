//! HTTP source tests against a mock backend

mod helpers;

use assert_matches::assert_matches;
use serde_json::json;
use std::time::Duration;

use confdesk::models::{AttendeeQuery, RegistrationStatus};
use confdesk::services::{
    AttendeeSource, ConferenceSource, HttpAttendeeSource, HttpConferenceSource, SourceFactory,
};
use confdesk::state::RefreshOutcome;
use confdesk::{ConsoleError, RosterPipeline, SourceError};
use helpers::*;

#[tokio::test]
async fn test_attendee_page_is_normalized() {
    init_test_logging();
    let mock = ConsoleMockServer::new().await;
    mock.mock_attendees(attendee_page_json()).await;
    let source = HttpAttendeeSource::new(&test_settings(&mock.base_url()).api).unwrap();

    let fetched = source.fetch_page(&AttendeeQuery::new(1, 20)).await.unwrap();
    let page = fetched.page;
    assert_eq!(page.len(), 2);
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.meta.total_pages, 1);

    let an = &page.records[0];
    assert_eq!(an.attendee.id, 1);
    assert_eq!(an.attendee.company.as_deref(), Some("Acme"));
    assert_eq!(an.registrations.len(), 2);
    assert_eq!(an.registrations[1].conference_id, 2);
    assert_eq!(an.registrations[1].status, RegistrationStatus::CheckedIn);
    assert!(an.registrations[1].checkin_time.is_some());

    let bob = &page.records[1];
    assert_eq!(bob.attendee.id, 2);
    // pending is a known alias, the unknown status is coerced, the row without
    // a conference id is dropped
    assert_eq!(bob.registrations.len(), 2);
    assert_eq!(bob.registrations[0].status, RegistrationStatus::Registered);
    assert!(!bob.registrations[0].status_coerced);
    assert!(bob.registrations[1].status_coerced);

    assert_eq!(fetched.report.dropped_attendees, 1);
    assert_eq!(fetched.report.dropped_registrations, 1);
    assert_eq!(fetched.report.coerced_statuses, 1);
}

#[tokio::test]
async fn test_query_parameters_are_sent() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_attendees(json!({ "data": [] })).await;
    let source = HttpAttendeeSource::new(&test_settings(&mock.base_url()).api).unwrap();

    let query = AttendeeQuery {
        search: Some("anna@x".to_string()),
        name: Some("an".to_string()),
        gender: Some("female".to_string()),
        ..AttendeeQuery::new(3, 10)
    };
    let fetched = source.fetch_page(&query).await.unwrap();
    assert!(fetched.page.is_empty());
    assert_eq!(fetched.page.meta.page, 3);
    assert_eq!(fetched.page.meta.limit, 10);

    let requests = mock.server.received_requests().await.unwrap();
    let url = &requests[0].url;
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for expected in [
        ("page", "3"),
        ("limit", "10"),
        ("search", "anna@x"),
        ("name", "an"),
        ("gender", "female"),
        ("includeRegistrations", "true"),
    ] {
        assert!(
            pairs.contains(&(expected.0.to_string(), expected.1.to_string())),
            "missing {:?} in {}",
            expected,
            url
        );
    }
}

#[tokio::test]
async fn test_catalog_accepts_bare_and_wrapped_arrays() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_conferences(catalog_json()).await;
    let source = HttpConferenceSource::new(&test_settings(&mock.base_url()).api).unwrap();

    let fetched = source.fetch_catalog().await.unwrap();
    assert_eq!(fetched.catalog.len(), 2);
    assert_eq!(fetched.catalog.get(1).unwrap().name, "RustConf");
    assert!(fetched.catalog.get(1).unwrap().start_date.is_some());

    mock.reset().await;
    mock.mock_conferences(json!({ "data": [{ "id": 7, "name": "Wrapped" }] }))
        .await;
    let fetched = source.fetch_catalog().await.unwrap();
    assert_eq!(fetched.catalog.get(7).unwrap().name, "Wrapped");
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_flaky("conferences", 2, catalog_json()).await;
    let source = HttpConferenceSource::new(&test_settings(&mock.base_url()).api).unwrap();

    let fetched = source.fetch_catalog().await.unwrap();
    assert_eq!(fetched.catalog.len(), 2);
    assert_eq!(mock.request_count("conferences").await, 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_failure(
        "attendees",
        500,
        json!({ "error": { "message": "database down" } }),
        3,
    )
    .await;
    let source = HttpAttendeeSource::new(&test_settings(&mock.base_url()).api).unwrap();

    let error = source.fetch_page(&AttendeeQuery::new(1, 20)).await.unwrap_err();
    assert!(error.is_retryable());
    assert_matches!(
        error,
        ConsoleError::Source(SourceError::HttpStatus { status: 500, ref message, .. })
            if message == "database down"
    );
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_failure("attendees", 404, json!({ "message": "Not found" }), 1)
        .await;
    let source = HttpAttendeeSource::new(&test_settings(&mock.base_url()).api).unwrap();

    let error = source.fetch_page(&AttendeeQuery::new(1, 20)).await.unwrap_err();
    assert!(!error.is_retryable());
    assert_matches!(
        error,
        ConsoleError::Source(SourceError::HttpStatus { status: 404, ref message, .. })
            if message == "Not found"
    );
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_conferences(catalog_json()).await;
    let mut settings = test_settings(&mock.base_url());
    settings.api.bearer_token = Some("secret-token".to_string());
    let source = HttpConferenceSource::new(&settings.api).unwrap();

    source.fetch_catalog().await.unwrap();
    let requests = mock.server.received_requests().await.unwrap();
    let header = requests[0].headers.get("authorization").unwrap();
    assert_eq!(header.to_str().unwrap(), "Bearer secret-token");
}

#[tokio::test]
async fn test_requests_are_spaced() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_conferences(catalog_json()).await;
    let mut settings = test_settings(&mock.base_url());
    settings.api.min_request_interval_ms = 200;
    let source = HttpConferenceSource::new(&settings.api).unwrap();

    let started = std::time::Instant::now();
    source.fetch_catalog().await.unwrap();
    source.fetch_catalog().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_pipeline_over_http_sources() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_attendees(attendee_page_json()).await;
    mock.mock_conferences(catalog_json()).await;
    let settings = test_settings(&mock.base_url());

    let (attendees, conferences) = SourceFactory::new(&settings).unwrap().into_parts();
    let pipeline = RosterPipeline::new(attendees, conferences, &settings);
    assert_matches!(
        pipeline.refresh().await.unwrap(),
        RefreshOutcome::Applied { attendees: 2, .. }
    );

    let views = pipeline.view().unwrap();
    assert_eq!(views[0].overall_status, RegistrationStatus::CheckedIn);
    // Bob: conf2 pending plus conf1 with an unknown status
    assert_eq!(views[1].overall_status, RegistrationStatus::Registered);
    assert_eq!(views[1].diagnostics.coerced_statuses, 1);
}

#[tokio::test]
async fn test_pipeline_degrades_when_catalog_endpoint_fails() {
    let mock = ConsoleMockServer::new().await;
    mock.mock_attendees(attendee_page_json()).await;
    mock.mock_failure("conferences", 400, json!({ "message": "bad" }), 1)
        .await;
    let settings = test_settings(&mock.base_url());

    let pipeline = RosterPipeline::from_settings(&settings).unwrap();
    pipeline.refresh().await.unwrap();
    let views = pipeline.view().unwrap();
    assert!(views
        .iter()
        .all(|v| v.conferences.is_empty()
            && v.overall_status == RegistrationStatus::NotRegistered));
}
