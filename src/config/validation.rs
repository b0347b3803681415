//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{ConsoleError, Result};

/// Shortest gap between two debounced search dispatches
pub const MIN_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_roster_config(&settings.roster)?;
    validate_export_config(&settings.export)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate backend API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(ConsoleError::Config("API base URL is required".to_string()));
    }

    let url = url::Url::parse(&config.base_url)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConsoleError::Config(format!(
            "API base URL must use http or https, got {}",
            url.scheme()
        )));
    }

    if config.timeout_seconds == 0 {
        return Err(ConsoleError::Config(
            "API timeout must be greater than 0".to_string(),
        ));
    }

    if config.max_retries == 0 {
        return Err(ConsoleError::Config(
            "At least one request attempt must be allowed".to_string(),
        ));
    }

    if let Some(ref token) = config.bearer_token {
        if token.trim().is_empty() {
            return Err(ConsoleError::Config(
                "Bearer token must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validate roster configuration
fn validate_roster_config(config: &super::RosterConfig) -> Result<()> {
    if config.page_size == 0 {
        return Err(ConsoleError::Config(
            "Page size must be greater than 0".to_string(),
        ));
    }

    if config.page_size > config.max_page_size {
        return Err(ConsoleError::Config(
            "Page size cannot be greater than max page size".to_string(),
        ));
    }

    if config.search_debounce_ms < MIN_SEARCH_DEBOUNCE_MS {
        return Err(ConsoleError::Config(format!(
            "Search debounce must be at least {}ms",
            MIN_SEARCH_DEBOUNCE_MS
        )));
    }

    Ok(())
}

/// Validate export configuration
fn validate_export_config(config: &super::ExportConfig) -> Result<()> {
    if config.file_prefix.trim().is_empty() {
        return Err(ConsoleError::Config(
            "Export file prefix is required".to_string(),
        ));
    }

    if config.output_dir.is_empty() {
        return Err(ConsoleError::Config(
            "Export output directory is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ConsoleError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ConsoleError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
