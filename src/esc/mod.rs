//! ESC environment access.
//!
//! - [`value`]: the dynamically typed property model and its coercion to bytes
//! - [`merge`]: dotted-key deep merge used to write one key into a document
//! - [`api`]: the [`EnvironmentApi`] trait consumed by the secrets adapter
//! - [`http`]: the REST implementation
//! - [`memory`]: an in-process implementation for development and tests

pub mod api;
pub mod error;
pub mod http;
pub mod memory;
pub mod merge;
pub mod value;

pub use api::{
    Diagnostic, EnvironmentApi, EnvironmentDefinition, EnvironmentDiagnostics, EnvironmentRef,
    OpenEnvironment,
};
pub use error::ApiError;
pub use http::{HttpEnvironmentApi, DEFAULT_API_URL};
pub use memory::{InMemoryEnvironmentApi, Operation};
pub use merge::merge_maps;
pub use value::{unwrap_one_layer, CoercionError, EscValue, PropertyMap, PropertyValue, Scalar};
