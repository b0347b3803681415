//! Mock console backend for testing
//!
//! Wraps a wiremock server that answers `GET /attendees` and
//! `GET /conferences` like the real backend.

use serde_json::Value;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock backend server
pub struct ConsoleMockServer {
    pub server: MockServer,
}

impl ConsoleMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Serve `body` for every attendee request
    pub async fn mock_attendees(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/attendees"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_conferences(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/conferences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `endpoint` with an error status, expecting exactly `times` calls
    pub async fn mock_failure(&self, endpoint: &str, status: u16, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Fail the first `failures` calls to `endpoint` with a 503, then serve `body`
    pub async fn mock_flaky(&self, endpoint: &str, failures: u64, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .with_priority(1)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .with_priority(2)
            .mount(&self.server)
            .await;
    }

    /// Serve `body` after `delay`
    pub async fn mock_slow(&self, endpoint: &str, delay: Duration, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    pub async fn request_count(&self, endpoint: &str) -> usize {
        let target = format!("/{}", endpoint);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == target)
            .count()
    }

    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
