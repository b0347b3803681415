//! Attendee source
//!
//! Paginated fetch of attendee rows, each bundled with its registrations.

use async_trait::async_trait;
use tracing::{debug, info};

use super::client::ApiClient;
use super::payload::{parse_attendee_page, ParseReport};
use crate::config::ApiConfig;
use crate::models::{AttendeePage, AttendeeQuery};
use crate::utils::errors::Result;

/// One fetched page plus the data-quality report from normalizing it
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub page: AttendeePage,
    pub report: ParseReport,
}

#[async_trait]
pub trait AttendeeSource: Send + Sync {
    /// Fetch one page of attendees, filtered server-side by search text, name
    /// and gender
    async fn fetch_page(&self, query: &AttendeeQuery) -> Result<FetchedPage>;
}

/// Attendee source backed by `GET attendees`
#[derive(Clone, Debug)]
pub struct HttpAttendeeSource {
    client: ApiClient,
}

impl HttpAttendeeSource {
    pub const SOURCE_NAME: &'static str = "attendees";

    /// Create a new HttpAttendeeSource instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }
}

#[async_trait]
impl AttendeeSource for HttpAttendeeSource {
    async fn fetch_page(&self, query: &AttendeeQuery) -> Result<FetchedPage> {
        debug!(page = query.page, limit = query.limit, search = ?query.search, name = ?query.name, gender = ?query.gender, "Fetching attendee page");

        let mut params = query.to_params();
        params.push(("includeRegistrations", "true".to_string()));

        let body = self
            .client
            .get_json(Self::SOURCE_NAME, Self::SOURCE_NAME, &params)
            .await?;
        let (page, report) = parse_attendee_page(body, query)?;

        info!(
            page = page.meta.page,
            rows = page.len(),
            total = page.meta.total,
            "Attendee page fetched"
        );
        Ok(FetchedPage { page, report })
    }
}
