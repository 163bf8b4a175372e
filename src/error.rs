//! Error types for RustPresence
//!
//! All errors in the application are converted to `AppError`. Whether an
//! error is fatal is decided by its handler: startup code propagates it out
//! of `main` (nonzero exit), the publish loop logs it and keeps its schedule.

use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error (settings or presence document)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No authentication token resolvable from any source
    #[error("Missing token: set DISCORD_TOKEN or add \"token\" to the presence document")]
    MissingToken,

    /// The platform rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The platform rejected or failed an API call
    #[error("Platform error: {0}")]
    Platform(String),

    /// HTTP client error (transport-level)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Stable label for the `errors_total` metric.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::MissingToken => "missing_token",
            AppError::Authentication(_) => "authentication",
            AppError::Platform(_) => "platform",
            AppError::HttpClient(_) => "http_client",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
