//! Common test utilities for all integration tests.
//!
//! Provides environment fixtures and in-memory provider setup.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use esc_secrets::esc::{EnvironmentRef, InMemoryEnvironmentApi, PropertyMap, PropertyValue};
use esc_secrets::secrets::EscSecretsClient;
use serde_json::Value;

pub const ORGANIZATION: &str = "acme";
pub const ENVIRONMENT: &str = "payments-dev";

pub fn environment() -> EnvironmentRef {
    EnvironmentRef::new(ORGANIZATION, ENVIRONMENT)
}

/// Build a plain document from a JSON object literal.
pub fn document(value: Value) -> PropertyMap {
    match PropertyValue::from(value) {
        PropertyValue::Map(map) => map,
        other => panic!("document fixture must be an object, got {}", other.kind()),
    }
}

/// Provider over an in-memory environment seeded with `value`.
pub fn in_memory_client(value: Value) -> EscSecretsClient<InMemoryEnvironmentApi> {
    let api = InMemoryEnvironmentApi::new().with_document(environment(), document(value));
    EscSecretsClient::new(api, environment())
}
