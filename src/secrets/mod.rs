//! Secrets provider backed by ESC environments.
//!
//! The orchestration controller talks to providers through the [`SecretsClient`] trait. This
//! module implements it with [`EscSecretsClient`]:
//!
//! - **get_secret**: read one property and return its bytes
//! - **get_secret_map**: read a map-valued property as a flat key/bytes map
//! - **push_secret**: merge one value into the environment document and write it back
//!
//! Existence checks, deletion and bulk listing are rejected without contacting ESC.
//!
//! # Example
//!
//! ```rust,ignore
//! use esc_secrets::config::EscProviderConfig;
//! use esc_secrets::secrets::{EscSecretsClient, PushSecretData, RemoteRef, Secret, SecretsClient};
//!
//! let config = EscProviderConfig::from_env()?;
//! let client = EscSecretsClient::from_config(&config)?;
//!
//! let password = client.get_secret(&RemoteRef::new("db.password")).await?;
//!
//! let secret = Secret::new("db-creds").with_data("password", "hunter2");
//! client.push_secret(&secret, &PushSecretData::new("password", "db.password")).await?;
//! ```
//!
//! # Security Considerations
//!
//! - Secret values are never logged or embedded in error messages
//! - The access token is held in a [`SecretString`] and redacted everywhere
//! - Pushes are a non-atomic read-merge-write; serialize concurrent pushes

pub mod client;
pub mod error;
pub mod esc;
pub mod types;

pub use client::{
    PushRemoteRef, PushSecretData, RemoteRef, Secret, SecretFind, SecretMap, SecretsClient,
    ValidationResult,
};
pub use error::{Result, SecretsError, UnsupportedOperation};
pub use esc::EscSecretsClient;
pub use types::SecretString;
