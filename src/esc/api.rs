//! The ESC environment API surface consumed by the secrets adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ApiError;
use super::value::{EscValue, PropertyMap};

/// Identifies one environment document: organization plus environment name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentRef {
    pub organization: String,
    pub environment: String,
}

impl EnvironmentRef {
    pub fn new(organization: impl Into<String>, environment: impl Into<String>) -> Self {
        Self { organization: organization.into(), environment: environment.into() }
    }
}

impl fmt::Display for EnvironmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.environment)
    }
}

/// A problem reported by ESC while evaluating or updating an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Handle for an opened environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenEnvironment {
    pub id: String,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl OpenEnvironment {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), diagnostics: Vec::new() }
    }
}

/// Diagnostics returned by an environment update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentDiagnostics {
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// The document written by an environment update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,

    #[serde(default)]
    pub values: PropertyMap,
}

impl EnvironmentDefinition {
    pub fn new(values: PropertyMap) -> Self {
        Self { imports: None, values }
    }
}

/// Read/update operations of the ESC API.
///
/// Implementations own their authentication; callers cancel a call by dropping its future.
#[async_trait]
pub trait EnvironmentApi: Send + Sync + fmt::Debug {
    /// Open an environment for reading.
    async fn open_environment(&self, env: &EnvironmentRef) -> Result<OpenEnvironment, ApiError>;

    /// Read a single property of an opened environment.
    ///
    /// The result is the wire form: map members and list items stay wrapped.
    async fn read_environment_property(
        &self,
        env: &EnvironmentRef,
        open_id: &str,
        property: &str,
    ) -> Result<EscValue, ApiError>;

    /// Open an environment and read its whole document.
    ///
    /// The returned document is plain: every wrapper layer is removed.
    async fn open_and_read_environment(
        &self,
        env: &EnvironmentRef,
    ) -> Result<(OpenEnvironment, PropertyMap), ApiError>;

    /// Replace the environment definition.
    async fn update_environment(
        &self,
        env: &EnvironmentRef,
        definition: &EnvironmentDefinition,
    ) -> Result<EnvironmentDiagnostics, ApiError>;
}
