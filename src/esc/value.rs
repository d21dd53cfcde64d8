//! ESC property values and their coercion into secret bytes.
//!
//! The ESC API returns untyped data: a property can be a scalar, a list, a nested mapping, or a
//! self-describing [`EscValue`] wrapper whose payload is any of those. [`PropertyValue`] models
//! that as an explicit tagged variant so every conversion is an exhaustive match.
//!
//! Two conversions matter to the secrets contract:
//! - [`PropertyValue::to_bytes`] is the only way a value leaves this crate as secret content
//! - [`unwrap_one_layer`] parses bytes produced by `to_bytes` back into a wrapper, which is how
//!   members of a map-valued property are reduced to their scalar payload

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as Json};
use std::collections::BTreeMap;
use thiserror::Error;

/// A property document: string keys to values, recursively.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Errors raised while coercing property values.
#[derive(Error, Debug)]
pub enum CoercionError {
    /// Bytes could not be parsed as an ESC value object.
    #[error("value is not a valid ESC value object: {0}")]
    Decode(#[source] serde_json::Error),

    /// A structured value could not be encoded.
    #[error("unable to encode structured value: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A dynamically typed ESC property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(Scalar),
    List(Vec<PropertyValue>),
    Map(PropertyMap),
    /// A self-describing wrapper around another value (`{"value": ..., "trace": ...}`).
    Wrapped(Box<EscValue>),
}

/// The ESC wire representation of an evaluated value.
///
/// `value` is required when decoding. Object members and list items of the payload that are
/// themselves wrappers stay [`PropertyValue::Wrapped`]; anything else is kept plain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscValue {
    #[serde(deserialize_with = "deserialize_payload")]
    pub value: PropertyValue,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unknown: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Json>,
}

impl EscValue {
    /// Wrap a payload with no trace information.
    pub fn new(value: impl Into<PropertyValue>) -> Self {
        Self { value: value.into(), secret: false, unknown: false, trace: None }
    }

    /// Mark the value as secret.
    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }
}

impl PropertyValue {
    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Wrap this value in an [`EscValue`].
    pub fn wrapped(self) -> Self {
        Self::Wrapped(Box::new(EscValue::new(self)))
    }

    /// Short name of the variant, for error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(Scalar::Null) => "null",
            Self::Scalar(Scalar::Bool(_)) => "bool",
            Self::Scalar(Scalar::Number(_)) => "number",
            Self::Scalar(Scalar::String(_)) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Wrapped(_) => "wrapped value",
        }
    }

    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert the value to its secret byte representation.
    ///
    /// Strings are taken as-is, numbers and booleans use their textual form and null is empty.
    /// Lists, maps and wrappers are encoded as compact JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoercionError> {
        match self {
            Self::Scalar(Scalar::Null) => Ok(Vec::new()),
            Self::Scalar(Scalar::Bool(b)) => Ok(b.to_string().into_bytes()),
            Self::Scalar(Scalar::Number(n)) => Ok(n.to_string().into_bytes()),
            Self::Scalar(Scalar::String(s)) => Ok(s.as_bytes().to_vec()),
            Self::List(_) | Self::Map(_) | Self::Wrapped(_) => {
                serde_json::to_vec(self).map_err(CoercionError::Encode)
            }
        }
    }

    /// Strip every wrapper layer, recursively.
    pub fn into_plain(self) -> Self {
        match self {
            Self::Wrapped(wrapper) => wrapper.value.into_plain(),
            Self::Map(map) => Self::Map(map.into_iter().map(|(k, v)| (k, v.into_plain())).collect()),
            Self::List(items) => Self::List(items.into_iter().map(Self::into_plain).collect()),
            scalar @ Self::Scalar(_) => scalar,
        }
    }

    /// Decode the payload of a wrapper as sent by the ESC API.
    fn from_wire(json: Json) -> Self {
        match json {
            Json::Object(members) => {
                Self::Map(members.into_iter().map(|(k, v)| (k, Self::wrapped_or_plain(v))).collect())
            }
            Json::Array(items) => Self::List(items.into_iter().map(Self::wrapped_or_plain).collect()),
            other => Self::from(other),
        }
    }

    fn wrapped_or_plain(json: Json) -> Self {
        if json.as_object().is_some_and(|members| members.contains_key("value")) {
            if let Ok(wrapper) = EscValue::deserialize(&json) {
                return Self::Wrapped(Box::new(wrapper));
            }
        }
        Self::from(json)
    }
}

/// Parse bytes previously produced by [`PropertyValue::to_bytes`] as an ESC value object.
pub fn unwrap_one_layer(bytes: &[u8]) -> Result<EscValue, CoercionError> {
    serde_json::from_slice(bytes).map_err(CoercionError::Decode)
}

/// Convert a property map into a plain document.
pub fn plain_map(map: PropertyMap) -> PropertyMap {
    map.into_iter().map(|(k, v)| (k, v.into_plain())).collect()
}

fn deserialize_payload<'de, D>(deserializer: D) -> Result<PropertyValue, D::Error>
where
    D: Deserializer<'de>,
{
    Json::deserialize(deserializer).map(PropertyValue::from_wire)
}

impl Serialize for PropertyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            Self::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
            Self::Wrapped(wrapper) => wrapper.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Plain documents only; wrapper detection happens inside `EscValue`.
        Json::deserialize(deserializer).map(Self::from)
    }
}

impl From<Json> for PropertyValue {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Self::Scalar(Scalar::Null),
            Json::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Json::Number(n) => Self::Scalar(Scalar::Number(n)),
            Json::String(s) => Self::Scalar(Scalar::String(s)),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(members) => {
                Self::Map(members.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Number(value.into()))
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        Self::Map(value)
    }
}

impl From<EscValue> for PropertyValue {
    fn from(value: EscValue) -> Self {
        Self::Wrapped(Box::new(value))
    }
}
