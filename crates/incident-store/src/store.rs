//! Incident store seam

use crate::error::StoreError;
use async_trait::async_trait;
use incident_core::{FieldUpdate, Incident, IncidentNumber};

/// Read/update access to incident records
///
/// Implementations hold no per-record locks: last write wins, and the
/// re-read after an update is not atomic with the write.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Look up one record by exact key match
    ///
    /// # Returns
    /// `Ok(None)` if no row matches
    async fn fetch_by_key(&self, key: &IncidentNumber) -> Result<Option<Incident>, StoreError>;

    /// Apply `fields` to the row matching `key`, then re-read it
    ///
    /// # Returns
    /// `Ok(None)` if the re-read finds no row
    async fn update_fields(
        &self,
        key: &IncidentNumber,
        fields: &FieldUpdate,
    ) -> Result<Option<Incident>, StoreError>;
}
