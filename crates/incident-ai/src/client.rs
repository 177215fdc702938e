//! HTTP client for the AI endpoint

use crate::error::AiError;
use crate::extract::extract_text;
use crate::request::ChatRequest;
use incident_core::AiConfig;
use reqwest::header::{HeaderName, HeaderValue};

/// Sends composed text to the AI endpoint and extracts the reply
///
/// One POST per call. No retry, timeout or streaming.
#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl AiClient {
    /// Create client with a default HTTP client
    #[must_use]
    pub fn new(config: AiConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create client sharing an existing HTTP client
    #[must_use]
    pub fn with_http_client(config: AiConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Whether an endpoint is configured
    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.endpoint.is_some()
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Request body for `text`
    #[must_use]
    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest::compose(&self.config, text)
    }

    /// Process `text` and return the extracted reply
    ///
    /// # Errors
    /// - `AiError::NotConfigured` if no endpoint is set
    /// - `AiError::InvalidHeader` if the key header cannot be built
    /// - `AiError::Transport` if the request fails
    /// - `AiError::Http` on a non-success status
    /// - `AiError::Decode` if the reply is not JSON
    pub async fn process(&self, text: &str) -> Result<String, AiError> {
        let endpoint = self.config.endpoint.as_deref().ok_or(AiError::NotConfigured)?;

        let mut request = self.http.post(endpoint).json(&self.build_request(text));
        if let Some(key) = &self.config.api_key {
            let name = HeaderName::from_bytes(self.config.header_name.as_bytes())
                .map_err(|_| AiError::InvalidHeader(self.config.header_name.clone()))?;
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| AiError::InvalidHeader(self.config.header_name.clone()))?;
            value.set_sensitive(true);
            request = request.header(name, value);
        }

        tracing::debug!("Posting {} chars to AI endpoint", text.len());
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::error!("AI endpoint returned {}", status);
            return Err(AiError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        Ok(extract_text(&value))
    }
}
