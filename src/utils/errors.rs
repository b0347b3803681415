//! Error handling for ConfDesk
//!
//! This module defines the main error types used throughout the roster engine.
//! Only source-unreachable conditions are meant to reach the user as retryable
//! failures; data-quality problems are absorbed where they are found.

use thiserror::Error;

/// Main error type for the roster engine
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failures of the attendee and conference sources
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{source_name} source unavailable: {message}")]
    Unavailable { source_name: String, message: String },

    #[error("{source_name} source timed out")]
    Timeout { source_name: String },

    #[error("{source_name} source returned HTTP {status}: {message}")]
    HttpStatus {
        source_name: String,
        status: u16,
        message: String,
    },

    #[error("Invalid {source_name} response: {message}")]
    InvalidResponse { source_name: String, message: String },
}

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl SourceError {
    /// Name of the source that failed
    pub fn source_name(&self) -> &str {
        match self {
            SourceError::Unavailable { source_name, .. }
            | SourceError::Timeout { source_name }
            | SourceError::HttpStatus { source_name, .. }
            | SourceError::InvalidResponse { source_name, .. } => source_name,
        }
    }

    /// Whether trying the same request again can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Unavailable { .. } => true,
            SourceError::Timeout { .. } => true,
            SourceError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            SourceError::InvalidResponse { .. } => false,
        }
    }
}

impl ConsoleError {
    /// Check if the error should offer the user a retry
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsoleError::Http(e) => e.is_timeout() || e.is_connect(),
            ConsoleError::Source(e) => e.is_retryable(),
            ConsoleError::Serialization(_) => false,
            ConsoleError::Io(_) => true,
            ConsoleError::UrlParse(_) => false,
            ConsoleError::Config(_) => false,
            ConsoleError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConsoleError::Config(_) => ErrorSeverity::Critical,
            ConsoleError::UrlParse(_) => ErrorSeverity::Critical,
            ConsoleError::Source(e) if e.is_retryable() => ErrorSeverity::Warning,
            ConsoleError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
