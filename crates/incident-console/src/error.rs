//! Error types for the console workflow
//!
//! Display strings are what the user sees after `Error: `.

use incident_ai::AiError;

/// Console errors
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Another action is still in flight
    #[error("another action is in progress")]
    Busy,

    /// Action needs a looked-up incident
    #[error("no incident loaded")]
    NoIncident,

    /// Field assignment is not `name=value`
    #[error("expected field=value, got {0:?}")]
    InvalidAssignment(String),

    /// API answered 404 to a lookup
    #[error("Incident {0} not found")]
    NotFound(String),

    /// Lookup failed for any other reason
    #[error("Failed to fetch incident: {0}")]
    Fetch(String),

    /// Save failed
    #[error("Failed to update incident: {0}")]
    Update(String),

    /// AI processing failed
    #[error(transparent)]
    Process(#[from] AiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_read_as_user_errors() {
        assert_eq!(
            ConsoleError::NotFound("INC9".into()).to_string(),
            "Incident INC9 not found"
        );
        assert_eq!(
            ConsoleError::Fetch("Internal Server Error".into()).to_string(),
            "Failed to fetch incident: Internal Server Error"
        );
        assert_eq!(
            ConsoleError::Process(AiError::Http { status: 502 }).to_string(),
            "HTTP error! Status: 502"
        );
    }
}
