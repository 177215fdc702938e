//! Workbench driven against the live API and AI endpoint

use crate::api_client::IncidentApiClient;
use crate::error::ConsoleError;
use crate::workbench::Workbench;
use incident_ai::AiClient;

/// Workbench plus the clients its actions call
///
/// Failures of the remote calls are recorded on the workbench as
/// user-visible errors; only refusals (busy, nothing loaded) are returned.
#[derive(Debug)]
pub struct IncidentConsole {
    api: IncidentApiClient,
    ai: AiClient,
    workbench: Workbench,
}

impl IncidentConsole {
    /// Create console over the given clients and workbench
    #[must_use]
    pub fn new(api: IncidentApiClient, ai: AiClient, workbench: Workbench) -> Self {
        Self { api, ai, workbench }
    }

    /// Current workbench state
    #[inline]
    #[must_use]
    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    /// Look up an incident
    ///
    /// # Errors
    /// `ConsoleError::Busy` while another action is in flight
    pub async fn lookup(&mut self, input: &str) -> Result<(), ConsoleError> {
        let Some(key) = self.workbench.begin_lookup(input)? else {
            return Ok(());
        };

        tracing::debug!("Looking up incident {}", key);
        let outcome = self.api.get_incident(&key).await;
        self.workbench.finish_lookup(outcome);
        Ok(())
    }

    /// Change a form value
    ///
    /// # Errors
    /// See [`Workbench::edit`]
    pub fn edit(&mut self, field: &str, value: impl Into<String>) -> Result<(), ConsoleError> {
        self.workbench.edit(field, value)
    }

    /// Submit the form
    ///
    /// # Errors
    /// `ConsoleError::Busy` while another action is in flight
    pub async fn save(&mut self) -> Result<(), ConsoleError> {
        let Some((key, values)) = self.workbench.begin_save()? else {
            return Ok(());
        };

        let outcome = self.api.put_incident(&key, &values).await;
        self.workbench.finish_save(outcome);
        Ok(())
    }

    /// Send the combined text to the AI endpoint
    ///
    /// # Errors
    /// `ConsoleError::Busy` while another action is in flight
    pub async fn process(&mut self) -> Result<(), ConsoleError> {
        let Some(text) = self.workbench.begin_process()? else {
            return Ok(());
        };

        let outcome = self.ai.process(&text).await.map_err(ConsoleError::from);
        self.workbench.finish_process(outcome);
        Ok(())
    }
}
