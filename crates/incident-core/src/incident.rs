//! Incident records
//!
//! An incident is an ordered mapping from column name to scalar value,
//! keyed by a caller-supplied incident number. Which columns exist is a
//! runtime matter decided by configuration and the table schema.

use crate::error::ModelError;
use crate::field::FieldName;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Caller-supplied incident key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IncidentNumber(String);

impl IncidentNumber {
    /// Trim and validate a key
    ///
    /// # Errors
    /// `ModelError::EmptyIncidentNumber` if nothing is left after trimming
    pub fn new(raw: &str) -> Result<Self, ModelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyIncidentNumber);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single scalar column value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL / JSON null
    Null,
    /// Integer value (JSON booleans are stored as 0/1)
    Integer(i64),
    /// Floating point value
    Real(f64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Whether the value is null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl TryFrom<serde_json::Value> for FieldValue {
    type Error = ModelError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Integer(i64::from(b))),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n.as_f64().map(Self::Real).ok_or(ModelError::NonScalarValue {
                    field: String::new(),
                }),
            },
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(_) | Value::Object(_) => Err(ModelError::NonScalarValue {
                field: String::new(),
            }),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Real(v) => serializer.serialize_f64(*v),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(raw).map_err(D::Error::custom)
    }
}

/// Incident record: column name → value, in retrieval order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Incident(IndexMap<String, FieldValue>);

impl Incident {
    /// Create empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, keeping the original position if present
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Look up a column
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no columns
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate columns in order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, FieldValue)> for Incident {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Allow-list filtered set of field assignments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate(IndexMap<FieldName, FieldValue>);

impl FieldUpdate {
    /// Create empty update
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a field
    pub fn set(&mut self, name: FieldName, value: FieldValue) {
        self.0.insert(name, value);
    }

    /// Value assigned to a field, by raw name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(n, _)| n.as_str() == name).map(|(_, v)| v)
    }

    /// Number of assignments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no assignments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate assignments in order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.0.iter()
    }

    /// Assigned field names
    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.0.keys()
    }
}

impl FromIterator<(FieldName, FieldValue)> for FieldUpdate {
    fn from_iter<T: IntoIterator<Item = (FieldName, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
