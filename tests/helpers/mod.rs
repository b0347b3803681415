//! Test helpers module
//!
//! Fixtures for attendees, conferences and registrations, plus a wiremock
//! backend that serves them over HTTP.

#![allow(dead_code)]

pub mod api_mock;
pub mod test_data;

#[allow(unused_imports)]
pub use api_mock::*;
pub use test_data::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("confdesk=debug")
            .with_test_writer()
            .try_init();
    });
}
