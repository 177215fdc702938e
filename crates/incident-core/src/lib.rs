//! Incident Core - shared model for the incident processor
//!
//! Provides the types every other crate speaks:
//! - Incident records as ordered field → scalar value maps
//! - Validated SQL field identifiers and the update allow-list
//! - Environment-sourced settings for the server, store, identity gate
//!   and AI client
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_core::{AllowList, FieldList, FieldUpdate};
//!
//! let fields: FieldList = "title,status".parse()?;
//! let allow = AllowList::from(&fields);
//!
//! let body = serde_json::json!({"status": "Closed", "hacker": "x"});
//! let update = allow.filter(body.as_object().unwrap())?;
//! assert_eq!(update.len(), 1);
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod field;
pub mod incident;

pub use config::{AccessPolicyConfig, AiConfig, DatabaseConfig, IdentityConfig, ServerConfig, Settings};
pub use error::{ConfigError, ModelError};
pub use field::{AllowList, FieldList, FieldName};
pub use incident::{FieldUpdate, FieldValue, Incident, IncidentNumber};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
