//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when talking to external services.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The adapter was built with missing or unusable settings.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The service answered but reported an application-level error.
    #[error("API error: {0}")]
    Api(String),

    /// Local storage I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(any(feature = "slack", feature = "http-store", feature = "lambda"))]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

/// Map a non-success HTTP status to an error.
#[cfg(any(feature = "slack", feature = "http-store", feature = "lambda"))]
pub(crate) fn check_status(status: reqwest::StatusCode) -> Result<(), AdapterError> {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(AdapterError::Auth(format!("API returned status {}", status)));
    }

    if !status.is_success() {
        return Err(AdapterError::Http(format!("API returned status {}", status)));
    }

    Ok(())
}

/// Trim a configured endpoint, rejecting a missing or blank one.
#[cfg(any(feature = "http-store", feature = "lambda"))]
pub(crate) fn required_endpoint(endpoint: Option<String>) -> Result<String, AdapterError> {
    match endpoint {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            Ok(endpoint.trim().trim_end_matches('/').to_string())
        }
        _ => Err(AdapterError::Config("an endpoint is required".to_string())),
    }
}
