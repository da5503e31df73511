//! Error types for Dashboard operations.
//!
//! This module provides the error hierarchy shared by the Dashboard client and
//! the fan-out fetcher, split into structured API failures and unexpected errors.

use thiserror::Error;

/// Main error type for Dashboard operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The Dashboard API rejected the request
    #[error("Dashboard API error {status}: {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Error messages reported in the response body
        message: String,
    },

    /// API key missing, invalid, or without access to the resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit still exceeded after all retries
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Dashboard service is unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Failed to parse a Dashboard response
    #[error("Failed to parse Dashboard response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Local I/O failure (backup files, certificates)
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for Dashboard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api { .. } => "API_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true when the Dashboard API itself answered with a failure.
    ///
    /// Everything else (transport, parsing, local failures) is unexpected and
    /// is reported under a different prefix by the fan-out fetcher.
    #[must_use]
    pub const fn is_api_error(&self) -> bool {
        matches!(
            self,
            Self::Api { .. }
                | Self::Unauthorized(_)
                | Self::NotFound(_)
                | Self::RateLimited(_)
                | Self::ServiceUnavailable(_)
        )
    }

    /// Returns true if a retry may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::ServiceUnavailable(_) | Self::Timeout(_) | Self::HttpError(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
