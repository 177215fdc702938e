//! File-backed identity provider
//!
//! Holds one ID token in a cache file. Silent authentication reads the
//! file; interactive login accepts a token obtained out of band (for
//! example pasted from a browser sign-in) and caches it; sign-out deletes
//! the file.
//!
//! Tokens are decoded locally to read claims. Audience and expiry are
//! checked; the signature is not, since the issuer's keys are not
//! available here. The API must not rely on these claims.

use crate::claims::IdTokenClaims;
use crate::error::ProviderError;
use crate::provider::IdentityProvider;
use async_trait::async_trait;
use incident_core::IdentityConfig;
use jsonwebtoken::{DecodingKey, Validation};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Identity provider over a token cache file
#[derive(Debug)]
pub struct TokenCacheProvider {
    client_id: String,
    cache_path: Option<PathBuf>,
    pending: Mutex<Option<String>>,
}

impl TokenCacheProvider {
    /// Provider for the configured client id and cache location
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            cache_path: config.token_cache.clone(),
            pending: Mutex::new(None),
        }
    }

    /// With cache file
    #[inline]
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Supply the token the next interactive login will use
    pub fn supply_token(&self, token: impl Into<String>) {
        *self.pending.lock() = Some(token.into().trim().to_string());
    }

    /// Cache file location
    #[inline]
    #[must_use]
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Decode claims and check audience and expiry
    ///
    /// # Errors
    /// `ProviderError::InvalidToken` if the token is malformed, expired, or
    /// issued for another client
    pub fn decode(&self, token: &str) -> Result<IdTokenClaims, ProviderError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        if self.client_id.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[self.client_id.as_str()]);
        }

        let data = jsonwebtoken::decode::<IdTokenClaims>(
            token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )?;
        Ok(data.claims)
    }
}

#[async_trait]
impl IdentityProvider for TokenCacheProvider {
    async fn acquire_silent(&self) -> Result<Option<IdTokenClaims>, ProviderError> {
        let Some(path) = &self.cache_path else {
            return Ok(None);
        };

        let token = match tokio::fs::read_to_string(path).await {
            Ok(token) => token,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!("Read cached ID token from {}", path.display());
        self.decode(token.trim()).map(Some)
    }

    async fn login_interactive(&self) -> Result<IdTokenClaims, ProviderError> {
        let token = self.pending.lock().take().filter(|t| !t.is_empty()).ok_or_else(|| {
            ProviderError::InteractionRequired("no ID token supplied".to_string())
        })?;

        let claims = self.decode(&token)?;

        if let Some(path) = &self.cache_path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &token).await?;
            tracing::debug!("Cached ID token at {}", path.display());
        }

        Ok(claims)
    }

    async fn sign_out(&self, post_logout_redirect: &str) -> Result<(), ProviderError> {
        self.pending.lock().take();

        if let Some(path) = &self.cache_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        tracing::info!("Signed out; continue at {}", post_logout_redirect);
        Ok(())
    }
}
