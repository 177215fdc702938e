//! Field identifiers and the update allow-list
//!
//! Every table, column and field name that ends up in SQL text passes
//! through [`FieldName`] first. Raw configuration strings are never
//! spliced into queries.

use crate::error::ModelError;
use crate::incident::{FieldUpdate, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,127}$").expect("identifier pattern is valid")
});

/// A validated SQL identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Validate and wrap an identifier
    ///
    /// # Errors
    /// `ModelError::InvalidFieldName` unless the name matches
    /// `[A-Za-z_][A-Za-z0-9_]*` and is at most 128 characters.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if IDENTIFIER.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(ModelError::InvalidFieldName(name))
        }
    }

    /// Built-in identifier known to be valid
    pub(crate) fn trusted(name: &'static str) -> Self {
        debug_assert!(IDENTIFIER.is_match(name));
        Self(name.to_string())
    }

    /// Raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier wrapped in double quotes for SQL text
    #[inline]
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FieldName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FieldName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(value: FieldName) -> Self {
        value.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered list of configured fields
///
/// Parsed from a comma-separated string. Blank entries are skipped and
/// duplicates collapse onto their first occurrence. An empty list means
/// "all columns" for retrieval and "nothing" for updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList(Vec<FieldName>);

impl FieldList {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name unless already present
    pub fn push(&mut self, name: FieldName) {
        if !self.0.contains(&name) {
            self.0.push(name);
        }
    }

    /// Whether no fields are configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of configured fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in configured order
    pub fn iter(&self) -> impl Iterator<Item = &FieldName> {
        self.0.iter()
    }

    /// Check membership by raw name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|f| f.as_str() == name)
    }
}

impl FromStr for FieldList {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut list = Self::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            list.push(FieldName::new(part)?);
        }
        Ok(list)
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldName;
    type IntoIter = std::slice::Iter<'a, FieldName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Server-held set of fields permitted in update requests
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    fields: HashSet<FieldName>,
}

impl AllowList {
    /// Allow-list from explicit names
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = FieldName>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Whether the name may be updated
    #[must_use]
    pub fn permits(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.as_str() == name)
    }

    /// Number of permitted fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing is permitted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Filter a raw update payload down to permitted fields
    ///
    /// Entries whose names are not allow-listed are dropped silently.
    ///
    /// # Errors
    /// - `ModelError::NoFields` if the payload is empty
    /// - `ModelError::NoAllowedFields` if nothing survives filtering
    /// - `ModelError::NonScalarValue` if a surviving value is an array or object
    pub fn filter(
        &self,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<FieldUpdate, ModelError> {
        if payload.is_empty() {
            return Err(ModelError::NoFields);
        }

        let mut update = FieldUpdate::new();
        for (name, value) in payload {
            let Some(field) = self.fields.iter().find(|f| f.as_str() == name) else {
                continue;
            };
            let value = FieldValue::try_from(value.clone()).map_err(|_| {
                ModelError::NonScalarValue {
                    field: name.clone(),
                }
            })?;
            update.set(field.clone(), value);
        }

        if update.is_empty() {
            return Err(ModelError::NoAllowedFields);
        }
        Ok(update)
    }
}

impl From<&FieldList> for AllowList {
    fn from(value: &FieldList) -> Self {
        Self::new(value.iter().cloned())
    }
}
