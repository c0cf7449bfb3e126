use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{BuildError, BuildResult, TokenError, TokenResult};

/// A single claim value, narrowed to the shapes role mapping cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    String(String),
    /// An array whose members are all strings.
    Strings(Vec<String>),
    Object(ClaimSet),
    /// Numbers, booleans, null and arrays that are not purely strings.
    Other(Value),
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ClaimValue::Strings(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ClaimSet> {
        match self {
            ClaimValue::Object(claims) => Some(claims),
            _ => None,
        }
    }
}

impl From<Value> for ClaimValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ClaimValue::String(text),
            Value::Object(map) => ClaimValue::Object(ClaimSet::from(map)),
            Value::Array(items) if items.iter().all(Value::is_string) => ClaimValue::Strings(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            other => ClaimValue::Other(other),
        }
    }
}

/// Claims decoded from one token. Built per request and dropped after the
/// role has been derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    entries: BTreeMap<String, ClaimValue>,
}

impl ClaimSet {
    pub fn get(&self, key: &str) -> Option<&ClaimValue> {
        self.entries.get(key)
    }

    /// Walks `path` one segment at a time. Every intermediate value has to be
    /// an object holding the next segment, otherwise the claim is absent.
    pub fn resolve(&self, path: &ClaimPath) -> Option<&ClaimValue> {
        let (first, rest) = path.segments.split_first()?;
        let mut current = self.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (key, ClaimValue::from(value)))
                .collect(),
        }
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = TokenError;

    fn try_from(value: Value) -> TokenResult<Self> {
        match value {
            Value::Object(map) => Ok(ClaimSet::from(map)),
            _ => Err(TokenError::Json("expected an object".to_string())),
        }
    }
}

/// Dot-delimited claim location such as `realm_access.roles`.
///
/// Keys containing a literal `.` cannot be addressed; there is no escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPath {
    segments: Vec<String>,
}

impl ClaimPath {
    pub fn parse(path: &str) -> BuildResult<Self> {
        let path = path.trim();
        if path.is_empty() {
            return Err(BuildError::InvalidConfig("claim path must not be empty"));
        }
        let segments: Vec<String> = path.split('.').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(BuildError::InvalidConfig(
                "claim path must not contain empty segments",
            ));
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for ClaimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
