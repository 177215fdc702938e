//! Incident Console - the incident workflow without a browser
//!
//! Look up an incident, edit its fields, save them back, and send the
//! combined field text to the AI endpoint. All state lives in a
//! [`Workbench`]; [`IncidentConsole`] drives it against the API and the
//! AI client. The binary puts every incident command behind the identity
//! gate.

#![warn(unreachable_pub)]

pub mod api_client;
pub mod error;
pub mod session;
pub mod workbench;

pub use api_client::IncidentApiClient;
pub use error::ConsoleError;
pub use session::IncidentConsole;
pub use workbench::{ResultView, Workbench};

/// Split a `field=value` argument
///
/// # Errors
/// `ConsoleError::InvalidAssignment` if there is no `=` or the field is blank
pub fn parse_assignment(arg: &str) -> Result<(String, String), ConsoleError> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(ConsoleError::InvalidAssignment(arg.to_string())),
    }
}
