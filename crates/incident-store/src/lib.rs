//! Incident Store - access to the incident table
//!
//! Two parameterized statements against one table:
//! - point lookup by incident number
//! - field-subset update by incident number, followed by a re-read
//!
//! Table, key column and field names come from configuration but are
//! checked against the live table schema before any query text is built.
//! Connections come from a bounded pool shared across requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_core::{DatabaseConfig, IncidentNumber};
//! use incident_store::{IncidentStore, SqliteIncidentStore};
//!
//! let store = SqliteIncidentStore::open(&DatabaseConfig::new("incidents.db")).await?;
//! let incident = store.fetch_by_key(&IncidentNumber::new("INC123")?).await?;
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod pool;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use pool::{ConnectionPool, PoolStats};
pub use schema::TableSchema;
pub use sqlite::SqliteIncidentStore;
pub use store::IncidentStore;
