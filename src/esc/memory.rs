//! In-process ESC API for development and testing.
//!
//! Environments are plain documents held in memory. Every call is counted per operation and any
//! operation can be forced to fail, which makes it possible to assert that a code path never
//! reached the remote API.
//!
//! ```rust,ignore
//! use esc_secrets::esc::{EnvironmentRef, InMemoryEnvironmentApi, Operation};
//!
//! let env = EnvironmentRef::new("acme", "dev");
//! let api = InMemoryEnvironmentApi::new().with_document(env.clone(), document);
//! let client = EscSecretsClient::new(api, env);
//! client.get_secret(&RemoteRef::new("db.password")).await?;
//! assert_eq!(client.api().call_count(Operation::ReadProperty), 1);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::api::{
    EnvironmentApi, EnvironmentDefinition, EnvironmentDiagnostics, EnvironmentRef, OpenEnvironment,
};
use super::error::ApiError;
use super::value::{EscValue, PropertyMap, PropertyValue};

/// The four calls of [`EnvironmentApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    ReadProperty,
    OpenAndRead,
    Update,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<EnvironmentRef, PropertyMap>,
    property_responses: HashMap<(EnvironmentRef, String), EscValue>,
    failures: HashMap<Operation, String>,
    calls: HashMap<Operation, usize>,
    updates: Vec<(EnvironmentRef, EnvironmentDefinition)>,
    next_open_id: u64,
}

/// [`EnvironmentApi`] over in-memory documents. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnvironmentApi {
    state: Arc<Mutex<State>>,
}

impl InMemoryEnvironmentApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an environment with its plain document.
    pub fn with_document(self, env: EnvironmentRef, document: PropertyMap) -> Self {
        self.set_document(env, document);
        self
    }

    pub fn set_document(&self, env: EnvironmentRef, document: PropertyMap) {
        self.lock().documents.insert(env, document);
    }

    /// Current document of an environment.
    pub fn document(&self, env: &EnvironmentRef) -> Option<PropertyMap> {
        self.lock().documents.get(env).cloned()
    }

    /// Serve `value` verbatim for reads of `property`, bypassing the document.
    pub fn set_property_response(&self, env: EnvironmentRef, property: impl Into<String>, value: EscValue) {
        self.lock().property_responses.insert((env, property.into()), value);
    }

    /// Make every subsequent call of `operation` fail with `message`.
    pub fn fail(&self, operation: Operation, message: impl Into<String>) {
        self.lock().failures.insert(operation, message.into());
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Definitions received by `update_environment`, oldest first.
    pub fn updates(&self) -> Vec<(EnvironmentRef, EnvironmentDefinition)> {
        self.lock().updates.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count the call and apply any forced failure.
    fn record(state: &mut State, operation: Operation) -> Result<(), ApiError> {
        *state.calls.entry(operation).or_insert(0) += 1;
        match state.failures.get(&operation) {
            Some(message) => Err(ApiError::rejected(message.clone())),
            None => Ok(()),
        }
    }

    fn open(state: &mut State, env: &EnvironmentRef) -> Result<OpenEnvironment, ApiError> {
        if !state.documents.contains_key(env) {
            return Err(ApiError::not_found(env.to_string()));
        }
        state.next_open_id += 1;
        Ok(OpenEnvironment::new(state.next_open_id.to_string()))
    }
}

/// Resolve a dotted property path through a plain document.
fn lookup<'a>(document: &'a PropertyMap, property: &str) -> Option<&'a PropertyValue> {
    let mut segments = property.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

/// Wrap a plain value the way the ESC API returns it: every nested member is itself wrapped.
fn to_wire(value: PropertyValue) -> EscValue {
    match value {
        PropertyValue::Map(members) => EscValue::new(PropertyValue::Map(
            members.into_iter().map(|(k, v)| (k, PropertyValue::from(to_wire(v)))).collect(),
        )),
        PropertyValue::List(items) => EscValue::new(PropertyValue::List(
            items.into_iter().map(|v| PropertyValue::from(to_wire(v))).collect(),
        )),
        PropertyValue::Wrapped(wrapper) => *wrapper,
        scalar @ PropertyValue::Scalar(_) => EscValue::new(scalar),
    }
}

#[async_trait]
impl EnvironmentApi for InMemoryEnvironmentApi {
    async fn open_environment(&self, env: &EnvironmentRef) -> Result<OpenEnvironment, ApiError> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::Open)?;
        Self::open(&mut state, env)
    }

    async fn read_environment_property(
        &self,
        env: &EnvironmentRef,
        _open_id: &str,
        property: &str,
    ) -> Result<EscValue, ApiError> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::ReadProperty)?;

        if let Some(value) = state.property_responses.get(&(env.clone(), property.to_string())) {
            return Ok(value.clone());
        }

        let document =
            state.documents.get(env).ok_or_else(|| ApiError::not_found(env.to_string()))?;
        lookup(document, property)
            .cloned()
            .map(to_wire)
            .ok_or_else(|| ApiError::not_found(format!("{}/{}", env, property)))
    }

    async fn open_and_read_environment(
        &self,
        env: &EnvironmentRef,
    ) -> Result<(OpenEnvironment, PropertyMap), ApiError> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::OpenAndRead)?;
        let opened = Self::open(&mut state, env)?;
        let document = state.documents.get(env).cloned().unwrap_or_default();
        Ok((opened, super::value::plain_map(document)))
    }

    async fn update_environment(
        &self,
        env: &EnvironmentRef,
        definition: &EnvironmentDefinition,
    ) -> Result<EnvironmentDiagnostics, ApiError> {
        let mut state = self.lock();
        Self::record(&mut state, Operation::Update)?;
        if !state.documents.contains_key(env) {
            return Err(ApiError::not_found(env.to_string()));
        }
        state.documents.insert(env.clone(), definition.values.clone());
        state.updates.push((env.clone(), definition.clone()));
        Ok(EnvironmentDiagnostics::default())
    }
}
