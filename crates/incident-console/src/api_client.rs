//! HTTP client for the incident API

use crate::error::ConsoleError;
use incident_core::{Incident, IncidentNumber};
use reqwest::{Response, StatusCode};

/// Client for `GET`/`PUT /api/incidents/{incidentNumber}`
#[derive(Debug, Clone)]
pub struct IncidentApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl IncidentApiClient {
    /// Client for the API at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Record URL with the incident number percent-encoded
    #[must_use]
    pub fn incident_url(&self, key: &IncidentNumber) -> String {
        format!(
            "{}/api/incidents/{}",
            self.base_url,
            urlencoding::encode(key.as_str())
        )
    }

    /// Look up an incident
    ///
    /// # Errors
    /// - `ConsoleError::NotFound` on 404
    /// - `ConsoleError::Fetch` on any other failure
    pub async fn get_incident(&self, key: &IncidentNumber) -> Result<Incident, ConsoleError> {
        let response = self
            .http
            .get(self.incident_url(key))
            .send()
            .await
            .map_err(|e| ConsoleError::Fetch(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ConsoleError::NotFound(key.to_string())),
            status if !status.is_success() => Err(ConsoleError::Fetch(status_text(&response))),
            _ => response.json().await.map_err(|e| ConsoleError::Fetch(e.to_string())),
        }
    }

    /// Submit field values and return the updated record
    ///
    /// # Errors
    /// `ConsoleError::Update` on any failure, including 404
    pub async fn put_incident(
        &self,
        key: &IncidentNumber,
        values: &Incident,
    ) -> Result<Incident, ConsoleError> {
        let response = self
            .http
            .put(self.incident_url(key))
            .json(values)
            .send()
            .await
            .map_err(|e| ConsoleError::Update(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConsoleError::Update(status_text(&response)));
        }
        response.json().await.map_err(|e| ConsoleError::Update(e.to_string()))
    }
}

fn status_text(response: &Response) -> String {
    let status = response.status();
    status
        .canonical_reason()
        .map_or_else(|| status.as_u16().to_string(), str::to_string)
}
