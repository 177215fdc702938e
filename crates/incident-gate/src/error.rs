//! Error types for the identity gate

use crate::state::GatePhase;

/// Identity provider failures
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Interactive login needs input that was not supplied
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    /// Token could not be decoded or failed audience/expiry checks
    #[error("invalid ID token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token cache could not be read or written
    #[error("token cache: {0}")]
    Cache(#[from] std::io::Error),
}

/// Gate errors
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Transition not in the transition table
    #[error("illegal gate transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current phase
        from: GatePhase,
        /// Requested phase
        to: GatePhase,
    },

    /// Provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
