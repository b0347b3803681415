//! Conference source
//!
//! Full fetch of the conference catalog. The catalog is reference data and is
//! not paginated for the roster's purposes.

use async_trait::async_trait;
use tracing::info;

use super::client::ApiClient;
use super::payload::{parse_catalog, ParseReport};
use crate::config::ApiConfig;
use crate::models::ConferenceCatalog;
use crate::utils::errors::Result;

/// The fetched catalog plus the data-quality report from normalizing it
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedCatalog {
    pub catalog: ConferenceCatalog,
    pub report: ParseReport,
}

#[async_trait]
pub trait ConferenceSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<FetchedCatalog>;
}

/// Conference source backed by `GET conferences`
#[derive(Clone, Debug)]
pub struct HttpConferenceSource {
    client: ApiClient,
}

impl HttpConferenceSource {
    pub const SOURCE_NAME: &'static str = "conferences";

    /// Create a new HttpConferenceSource instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }
}

#[async_trait]
impl ConferenceSource for HttpConferenceSource {
    async fn fetch_catalog(&self) -> Result<FetchedCatalog> {
        let body = self
            .client
            .get_json(Self::SOURCE_NAME, Self::SOURCE_NAME, &[])
            .await?;
        let (conferences, report) = parse_catalog(body)?;
        let catalog = ConferenceCatalog::new(conferences);

        info!(conferences = catalog.len(), "Conference catalog fetched");
        Ok(FetchedCatalog { catalog, report })
    }
}
