//! Chat-completion request payload

use incident_core::AiConfig;
use serde::Serialize;

/// Request body sent to the endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Conversation; always a single system message
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling mass
    pub top_p: f64,
    /// Completion token limit
    pub max_tokens: u32,
}

/// One message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Speaker role
    pub role: String,
    /// Content parts
    pub content: Vec<ContentPart>,
}

/// Typed content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentPart {
    /// Part type, `text`
    #[serde(rename = "type")]
    pub kind: String,
    /// Text
    pub text: String,
}

impl ChatRequest {
    /// System message of `"<statement> <text>"` with the configured
    /// generation parameters
    #[must_use]
    pub fn compose(config: &AiConfig, text: &str) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: vec![ContentPart {
                    kind: "text".to_string(),
                    text: format!("{} {}", config.preconfigured_statement, text),
                }],
            }],
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }
}
