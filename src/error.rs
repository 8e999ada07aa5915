//! Error types for Searchlens
//!
//! This module defines the application-level error type, using `thiserror`
//! for ergonomic error handling. Request failures seen by the views are
//! typed separately as [`crate::api::ApiError`] because they are recovered
//! inline instead of propagated.

use thiserror::Error;

/// Main error type for Searchlens operations
///
/// Covers configuration loading, backend client construction, and the
/// I/O and serialization failures that can abort a CLI command.
#[derive(Error, Debug)]
pub enum SearchlensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend client errors (client construction, health checks)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Interactive session errors (unknown tab, bad command usage)
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Searchlens operations
///
/// Uses `anyhow::Error` so commands can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;
