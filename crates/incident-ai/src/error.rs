//! Error types for the AI client

/// AI processing errors
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// No endpoint configured
    #[error("AI endpoint is not configured (set API_ENDPOINT)")]
    NotConfigured,

    /// Header name or key cannot be sent as an HTTP header
    #[error("invalid API key header: {0}")]
    InvalidHeader(String),

    /// Request could not be sent or the body not read
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("HTTP error! Status: {status}")]
    Http {
        /// Status code
        status: u16,
    },

    /// Success response was not JSON
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}
