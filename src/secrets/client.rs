//! The secrets contract consumed by the orchestration controller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::Result;

/// Flat secret map: key to raw bytes.
pub type SecretMap = BTreeMap<String, Vec<u8>>;

/// Reference to a remote secret.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteRef {
    /// Property key, possibly dotted.
    pub key: String,

    /// Sub-property selector. Not used by the ESC provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,

    /// Version selector. Not used by the ESC provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RemoteRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), property: None, version: None }
    }
}

/// Search criteria for bulk listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretFind {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Which entry of a local secret goes to which remote key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PushSecretData {
    /// Key inside the local secret's data.
    pub secret_key: String,

    /// Destination key in the environment, possibly dotted.
    pub remote_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl PushSecretData {
    pub fn new(secret_key: impl Into<String>, remote_key: impl Into<String>) -> Self {
        Self { secret_key: secret_key.into(), remote_key: remote_key.into(), property: None }
    }
}

/// Reference to a previously pushed remote value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PushRemoteRef {
    pub remote_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl PushRemoteRef {
    pub fn new(remote_key: impl Into<String>) -> Self {
        Self { remote_key: remote_key.into(), property: None }
    }
}

/// A local secret held by the controller.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret {
    pub name: String,
    pub namespace: Option<String>,
    pub data: SecretMap,
}

impl Secret {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: None, data: SecretMap::new() }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

// Data values are secret material; only the keys are printed.
impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("data_keys", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Outcome of a provider health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationResult {
    Ready,
    Unknown,
    Error,
}

/// Contract implemented by every secrets provider.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log secret values
/// - Errors MUST NOT embed secret values
///
/// Every call is request scoped; dropping the returned future cancels it.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    /// Fetch one remote value as bytes.
    ///
    /// # Errors
    ///
    /// Remote failures propagate as [`SecretsError::Api`](super::SecretsError::Api); values that
    /// cannot be turned into bytes fail with [`SecretsError::Coercion`](super::SecretsError::Coercion).
    async fn get_secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>>;

    /// Fetch a map-valued remote property as a flat secret map.
    ///
    /// All or nothing: one bad member fails the whole call.
    async fn get_secret_map(&self, remote_ref: &RemoteRef) -> Result<SecretMap>;

    /// Fetch every secret matching `find`.
    async fn get_all_secrets(&self, find: &SecretFind) -> Result<SecretMap>;

    /// Write one entry of `secret` to `data.remote_key`.
    async fn push_secret(&self, secret: &Secret, data: &PushSecretData) -> Result<()>;

    /// Check whether a remote value exists.
    async fn secret_exists(&self, remote_ref: &PushRemoteRef) -> Result<bool>;

    /// Remove a remote value.
    async fn delete_secret(&self, remote_ref: &PushRemoteRef) -> Result<()>;

    /// Report provider readiness.
    fn validate(&self) -> Result<ValidationResult>;

    /// Release provider resources.
    async fn close(&self) -> Result<()>;
}
