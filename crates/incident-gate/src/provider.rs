//! Identity provider seam

use crate::claims::IdTokenClaims;
use crate::error::ProviderError;
use async_trait::async_trait;

/// Session source for the gate
///
/// The gate owns state and policy; a provider only hands out ID token
/// claims and ends sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Try to resume an existing session without user interaction
    ///
    /// # Returns
    /// `Ok(None)` if there is no session to resume
    async fn acquire_silent(&self) -> Result<Option<IdTokenClaims>, ProviderError>;

    /// Sign the user in interactively
    async fn login_interactive(&self) -> Result<IdTokenClaims, ProviderError>;

    /// End the session; `post_logout_redirect` is where the user lands
    async fn sign_out(&self, post_logout_redirect: &str) -> Result<(), ProviderError>;
}
