//! Application settings management
//!
//! This module defines the configuration structure and loads it from built-in
//! defaults, an optional `confdesk.*` file in any format `config` supports
//! (TOML, YAML, JSON and others), then `CONFDESK__*` environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub roster: RosterConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Console backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub min_request_interval_ms: u64,
    pub bearer_token: Option<String>,
}

/// Roster paging and search behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterConfig {
    pub page_size: u32,
    pub max_page_size: u32,
    pub search_debounce_ms: u64,
}

/// Export file configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    pub file_prefix: String,
    pub output_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
    pub json: bool,
}

impl Settings {
    /// Load settings from `confdesk.*` in the working directory and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load("confdesk")
    }

    /// Load settings with `file_stem` as the optional configuration file; the
    /// extension picks the format
    pub fn load(file_stem: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(config::Environment::with_prefix("CONFDESK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ConsoleError> {
        super::validation::validate_settings(self)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

impl RosterConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:4000/api/v1".to_string(),
                timeout_seconds: 30,
                max_retries: 3,
                retry_base_delay_ms: 1000,
                min_request_interval_ms: 300,
                bearer_token: None,
            },
            roster: RosterConfig {
                page_size: 20,
                max_page_size: 100,
                search_debounce_ms: 300,
            },
            export: ExportConfig {
                file_prefix: "attendees".to_string(),
                output_dir: ".".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                json: false,
            },
        }
    }
}
