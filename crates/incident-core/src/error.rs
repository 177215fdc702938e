//! Error types for the incident model
//!
//! Two families:
//! - Model errors raised while validating identifiers, keys and payloads
//! - Configuration errors raised while reading settings

/// Model validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Identifier is not a plain SQL identifier
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// Incident number is empty after trimming
    #[error("incident number is required")]
    EmptyIncidentNumber,

    /// Incident number could not be percent-decoded
    #[error("incident number is not valid UTF-8 after decoding")]
    MalformedIncidentNumber,

    /// A field value was an array or object
    #[error("field {field} must be a scalar value")]
    NonScalarValue {
        /// Offending field
        field: String,
    },

    /// Update payload had no entries at all
    #[error("no fields provided for update")]
    NoFields,

    /// Every entry of the payload was dropped by the allow-list
    #[error("no valid fields provided for update")]
    NoAllowedFields,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required variable not set
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    /// Variable set but unparseable
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Build an invalid-value error
    #[inline]
    pub fn invalid(var: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        let err = ModelError::NonScalarValue {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "field title must be a scalar value");
        assert_eq!(
            ModelError::NoAllowedFields.to_string(),
            "no valid fields provided for update"
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::invalid("DB_POOL_MAX", "ten", "not a number");
        assert!(err.to_string().contains("DB_POOL_MAX"));
        assert!(err.to_string().contains("\"ten\""));
    }
}
