//! Incident AI - client for the external text-processing endpoint
//!
//! Builds a single-message chat request from a preconfigured statement
//! and the user's text, posts it, and pulls free text out of whatever
//! JSON comes back.
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_ai::AiClient;
//!
//! let client = AiClient::new(settings.ai);
//! let summary = client.process("title: Disk full\n\nstatus: Open").await?;
//! ```

#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod extract;
pub mod request;

pub use client::AiClient;
pub use error::AiError;
pub use extract::extract_text;
pub use request::{ChatMessage, ChatRequest, ContentPart};
