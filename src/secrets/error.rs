//! Error types for secrets contract operations.

use std::fmt;
use thiserror::Error;

use crate::esc::{ApiError, CoercionError};

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Contract operations the ESC provider refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedOperation {
    SecretExists,
    DeleteSecret,
    GetAllSecrets,
}

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::SecretExists => "checking whether a secret exists is not supported by the ESC provider",
            Self::DeleteSecret => "deleting secrets is not supported by the ESC provider",
            Self::GetAllSecrets => "getting all secrets is not supported by the ESC provider",
        };
        f.write_str(message)
    }
}

/// Errors returned by [`crate::secrets::SecretsClient`] operations.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The operation is rejected without contacting the backend.
    #[error("{0}")]
    Unsupported(UnsupportedOperation),

    /// A remote call failed while reading a property.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading the full environment before a push failed.
    #[error("error reading environment: {0}")]
    ReadEnvironment(#[source] ApiError),

    /// Writing the merged environment failed.
    #[error("error pushing secret: {0}")]
    PushSecret(#[source] ApiError),

    /// A property expected to be a map had another shape.
    #[error("value of property '{key}' is a {found}, expected a map")]
    InvalidShape { key: String, found: &'static str },

    /// One member of a map-valued property could not be converted.
    #[error("unable to get value for key {key}: {source}")]
    MemberValue {
        key: String,
        #[source]
        source: CoercionError,
    },

    /// A property value could not be converted to bytes.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// The pushed secret has no entry for the requested data key.
    #[error("secret '{secret}' has no data key '{key}'")]
    MissingSecretKey { secret: String, key: String },

    /// Secret value validation failed.
    #[error("Invalid secret value: {reason}")]
    InvalidValue { reason: String },

    /// Provider configuration is invalid.
    #[error(transparent)]
    Config(#[from] crate::errors::Error),
}

impl SecretsError {
    pub fn unsupported(operation: UnsupportedOperation) -> Self {
        Self::Unsupported(operation)
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue { reason: reason.into() }
    }

    pub fn missing_secret_key(secret: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingSecretKey { secret: secret.into(), key: key.into() }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
