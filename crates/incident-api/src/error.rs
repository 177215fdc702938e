//! API errors and their HTTP mapping
//!
//! Validation problems surface to the caller verbatim. Store failures
//! surface only as a generic message; the cause goes to the log.

use incident_core::ModelError;
use incident_store::StoreError;
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

/// Request handling errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Path carried no incident number
    #[error("Incident number is required")]
    MissingIncidentNumber,

    /// Body is not a JSON object
    #[error("Request body must be a JSON object")]
    InvalidBody,

    /// Key or payload failed validation
    #[error(transparent)]
    Invalid(#[from] ModelError),

    /// No row matched the key
    #[error("Incident not found")]
    NotFound,

    /// Lookup failed in the store
    #[error("Failed to fetch incident details")]
    Fetch(#[source] StoreError),

    /// Update failed in the store
    #[error("Failed to update incident details")]
    Update(#[source] StoreError),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingIncidentNumber | Self::InvalidBody | Self::Invalid(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Fetch(_) | Self::Update(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Invalid(ModelError::EmptyIncidentNumber) => {
                Self::MissingIncidentNumber.to_string()
            }
            Self::Invalid(ModelError::MalformedIncidentNumber) => {
                "Incident number is malformed".to_string()
            }
            Self::Invalid(ModelError::NoFields) => "No fields provided for update".to_string(),
            Self::Invalid(ModelError::NoAllowedFields) => {
                "No valid fields provided for update".to_string()
            }
            Self::Invalid(ModelError::NonScalarValue { field }) => {
                format!("Field {field} must be a string, number, boolean or null")
            }
            other => other.to_string(),
        }
    }

    /// Build the `{"error": ...}` response, logging server-side causes
    #[must_use]
    pub fn into_response(self) -> Response {
        match &self {
            Self::Fetch(source) => tracing::error!("Error fetching incident: {}", source),
            Self::Update(source) => tracing::error!("Error updating incident: {}", source),
            _ => tracing::debug!("Rejected request: {}", self),
        }

        error_reply(self.status(), &self.message())
    }
}

/// JSON error body with the given status
pub(crate) fn error_reply(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
        .into_response()
}
