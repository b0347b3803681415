//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the roster engine.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LoggingConfig;
use crate::models::ViewDiagnostics;
use crate::utils::errors::{ConsoleError, Result};

/// Initialize logging based on configuration.
///
/// When a log directory is configured the returned guard must be kept alive
/// for the file writer to flush.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| ConsoleError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.directory {
        Some(ref directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "confdesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConsoleError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log one completed pipeline run
pub fn log_pipeline_run(token: u64, attendees: usize, conferences: usize, duration_ms: u64) {
    info!(
        token = token,
        attendees = attendees,
        conferences = conferences,
        duration_ms = duration_ms,
        "Roster pipeline run completed"
    );
}

/// Log a failed source fetch
pub fn log_source_failure(source: &str, error: &str, degraded: bool) {
    if degraded {
        warn!(
            source = source,
            error = error,
            "Source failed, continuing with empty data"
        );
    } else {
        error!(source = source, error = error, "Source fetch failed");
    }
}

/// Log data-quality coercions absorbed while deriving views
pub fn log_coercions(diagnostics: &ViewDiagnostics) {
    if diagnostics.is_clean() {
        return;
    }
    debug!(
        unresolved_conferences = diagnostics.unresolved_conferences,
        duplicate_registrations = diagnostics.duplicate_registrations,
        coerced_statuses = diagnostics.coerced_statuses,
        "Registration data coerced during derivation"
    );
}

/// Log an export
pub fn log_export(filename: &str, rows: usize, bytes: usize) {
    info!(filename = filename, rows = rows, bytes = bytes, "Roster exported");
}
