//! Errors returned by ESC API clients.

use thiserror::Error;

/// Failures talking to the ESC API.
///
/// These propagate unchanged through read operations, so the variants describe the remote call
/// and never carry secret values.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The access token was missing, invalid, or lacks permission.
    #[error("ESC API rejected the access token (status {status})")]
    Unauthorized { status: u16 },

    /// The environment, open session, or property does not exist.
    #[error("ESC resource not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-success response.
    #[error("ESC API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS, or timeout failure.
    #[error("ESC API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("unable to decode ESC API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The environment definition could not be encoded.
    #[error("unable to encode environment definition: {0}")]
    Encode(#[source] serde_yaml::Error),

    /// A call rejected by a non-HTTP client.
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
