//! Authentication gate
//!
//! Owns the phase, the current user and the authorization decision.
//! Every authentication event (silent, interactive or an external
//! login-success notification) recomputes user info and the decision.

use crate::claims::{IdTokenClaims, UserInfo};
use crate::error::GateError;
use crate::policy::AccessPolicy;
use crate::provider::IdentityProvider;
use crate::state::{validate_transition, GatePhase};
use incident_core::IdentityConfig;

/// What the gate lets the application show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<'a, T> {
    /// Authentication unresolved
    Loading,
    /// No session; offer sign-in
    LoginPrompt,
    /// Signed in without the required membership
    AccessDenied {
        /// Policy the user failed
        policy: &'a AccessPolicy,
        /// Who was denied
        user: &'a UserInfo,
    },
    /// Protected content
    Protected(T),
}

/// Identity gate over an injected provider
#[derive(Debug)]
pub struct AuthGate<P> {
    provider: P,
    policy: AccessPolicy,
    app_origin: String,
    phase: GatePhase,
    user: Option<UserInfo>,
    silent_attempted: bool,
}

impl<P: IdentityProvider> AuthGate<P> {
    /// Create gate in `Unauthenticated`
    #[must_use]
    pub fn new(provider: P, config: &IdentityConfig) -> Self {
        Self {
            provider,
            policy: AccessPolicy::from_config(&config.policy),
            app_origin: config.app_origin.clone(),
            phase: GatePhase::Unauthenticated,
            user: None,
            silent_attempted: false,
        }
    }

    /// Attempt silent authentication, at most once per gate
    ///
    /// A provider failure leaves the gate `Unauthenticated`; it is logged,
    /// not returned.
    ///
    /// # Errors
    /// `GateError::IllegalTransition` only on a broken transition table
    pub async fn initialize(&mut self) -> Result<GatePhase, GateError> {
        if self.silent_attempted {
            return Ok(self.phase);
        }
        self.silent_attempted = true;

        if self.phase != GatePhase::Unauthenticated {
            return Ok(self.phase);
        }

        self.transition(GatePhase::Authenticating)?;
        match self.provider.acquire_silent().await {
            Ok(Some(claims)) => self.resolve(claims)?,
            Ok(None) => {
                tracing::debug!("No session to resume");
                self.transition(GatePhase::Unauthenticated)?;
            }
            Err(err) => {
                tracing::info!("Silent authentication failed: {}", err);
                self.transition(GatePhase::Unauthenticated)?;
            }
        }

        Ok(self.phase)
    }

    /// Interactive login
    ///
    /// # Errors
    /// - `GateError::IllegalTransition` if the user is already authorized
    /// - `GateError::Provider` if login fails; the gate is then
    ///   `Unauthenticated`
    pub async fn login(&mut self) -> Result<GatePhase, GateError> {
        self.transition(GatePhase::Authenticating)?;

        match self.provider.login_interactive().await {
            Ok(claims) => {
                self.resolve(claims)?;
                Ok(self.phase)
            }
            Err(err) => {
                tracing::error!("Interactive login failed: {}", err);
                self.user = None;
                self.transition(GatePhase::Unauthenticated)?;
                Err(err.into())
            }
        }
    }

    /// Handle a login-success event raised outside the gate
    ///
    /// # Errors
    /// `GateError::IllegalTransition` only on a broken transition table
    pub fn on_login_success(&mut self, claims: IdTokenClaims) -> Result<GatePhase, GateError> {
        self.resolve(claims)?;
        Ok(self.phase)
    }

    /// End the session
    ///
    /// Local state is cleared even if the provider fails.
    ///
    /// # Returns
    /// The application origin to redirect to
    ///
    /// # Errors
    /// `GateError::Provider` if the provider could not end its session
    pub async fn sign_out(&mut self) -> Result<String, GateError> {
        let result = self.provider.sign_out(&self.app_origin).await;

        if self.phase != GatePhase::Unauthenticated {
            self.transition(GatePhase::Unauthenticated)?;
        }
        self.user = None;

        result?;
        Ok(self.app_origin.clone())
    }

    fn resolve(&mut self, claims: IdTokenClaims) -> Result<(), GateError> {
        let user = UserInfo::from(claims);
        let authorized = self.policy.authorizes(&user);

        tracing::debug!(
            "Authorization check: {} against groups {:?}",
            self.policy,
            user.groups
        );

        let next = if authorized {
            GatePhase::Authorized
        } else {
            GatePhase::Unauthorized
        };
        self.transition(next)?;

        if authorized {
            tracing::info!("User {} authorized", user.display_name());
        } else {
            tracing::warn!(
                "User {} is not authorized ({})",
                user.display_name(),
                self.policy
            );
        }

        self.user = Some(user);
        Ok(())
    }

    fn transition(&mut self, to: GatePhase) -> Result<(), GateError> {
        validate_transition(self.phase, to)?;
        self.phase = to;
        Ok(())
    }
}

impl<P> AuthGate<P> {
    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// Signed-in user, authorized or not
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    /// Whether a user is signed in
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase.is_authenticated()
    }

    /// Whether the signed-in user passed the policy
    #[inline]
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.phase == GatePhase::Authorized
    }

    /// Whether authentication is unresolved: in flight, or silent
    /// authentication not yet attempted
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == GatePhase::Authenticating
            || (self.phase == GatePhase::Unauthenticated && !self.silent_attempted)
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Application origin used after sign-out
    #[inline]
    #[must_use]
    pub fn app_origin(&self) -> &str {
        &self.app_origin
    }

    /// Injected provider
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Gate protected content
    ///
    /// `protected` runs only when the user is authorized.
    pub fn render<'a, T>(&'a self, protected: impl FnOnce(&'a UserInfo) -> T) -> GateView<'a, T> {
        if self.is_loading() {
            return GateView::Loading;
        }
        match (self.phase, self.user.as_ref()) {
            (GatePhase::Authorized, Some(user)) => GateView::Protected(protected(user)),
            (GatePhase::Unauthorized, Some(user)) => GateView::AccessDenied {
                policy: &self.policy,
                user,
            },
            _ => GateView::LoginPrompt,
        }
    }

    /// Gate view with the user as protected content
    #[must_use]
    pub fn view(&self) -> GateView<'_, &UserInfo> {
        self.render(|user| user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::MockIdentityProvider;
    use std::cell::Cell;

    const GROUP: &str = "grp-ops";

    fn config() -> IdentityConfig {
        IdentityConfig::default().with_required_group(GROUP)
    }

    fn claims(groups: &[&str]) -> IdTokenClaims {
        IdTokenClaims {
            name: Some("Ada".into()),
            preferred_username: Some("ada@example.com".into()),
            roles: vec![],
            groups: groups.iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn silent_session_in_group_is_authorized() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .times(1)
            .returning(|| Ok(Some(claims(&["other", GROUP]))));
        let mut gate = AuthGate::new(provider, &config());

        assert!(gate.is_loading());
        assert_eq!(gate.initialize().await.unwrap(), GatePhase::Authorized);
        assert!(matches!(gate.view(), GateView::Protected(user) if user.display_name() == "Ada"));
    }

    #[tokio::test]
    async fn silent_session_outside_group_is_denied_and_content_not_evaluated() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .returning(|| Ok(Some(claims(&["other"]))));
        let mut gate = AuthGate::new(provider, &config());
        gate.initialize().await.unwrap();

        let evaluated = Cell::new(false);
        let view = gate.render(|_| evaluated.set(true));

        assert_eq!(gate.phase(), GatePhase::Unauthorized);
        assert!(gate.is_authenticated());
        assert!(matches!(view, GateView::AccessDenied { policy, .. } if policy.requirement() == GROUP));
        assert!(!evaluated.get());
    }

    #[tokio::test]
    async fn silent_auth_runs_once() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_acquire_silent().times(1).returning(|| Ok(None));
        let mut gate = AuthGate::new(provider, &config());

        assert_eq!(gate.initialize().await.unwrap(), GatePhase::Unauthenticated);
        assert_eq!(gate.initialize().await.unwrap(), GatePhase::Unauthenticated);
        assert_eq!(gate.view(), GateView::LoginPrompt);
    }

    #[tokio::test]
    async fn silent_failure_stays_unauthenticated() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .returning(|| Err(ProviderError::InteractionRequired("consent".into())));
        let mut gate = AuthGate::new(provider, &config());

        assert_eq!(gate.initialize().await.unwrap(), GatePhase::Unauthenticated);
        assert!(!gate.is_loading());
    }

    #[tokio::test]
    async fn failed_login_returns_to_unauthenticated() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_acquire_silent().returning(|| Ok(None));
        provider
            .expect_login_interactive()
            .returning(|| Err(ProviderError::InteractionRequired("cancelled".into())));
        let mut gate = AuthGate::new(provider, &config());
        gate.initialize().await.unwrap();

        assert!(matches!(gate.login().await, Err(GateError::Provider(_))));
        assert_eq!(gate.phase(), GatePhase::Unauthenticated);
        assert!(gate.user().is_none());
    }

    #[tokio::test]
    async fn unauthorized_user_can_switch_accounts() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .returning(|| Ok(Some(claims(&[]))));
        provider
            .expect_login_interactive()
            .returning(|| Ok(claims(&[GROUP])));
        let mut gate = AuthGate::new(provider, &config());

        gate.initialize().await.unwrap();
        assert_eq!(gate.phase(), GatePhase::Unauthorized);
        assert_eq!(gate.login().await.unwrap(), GatePhase::Authorized);
    }

    #[tokio::test]
    async fn login_success_event_recomputes_decision() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .returning(|| Ok(Some(claims(&[GROUP]))));
        let mut gate = AuthGate::new(provider, &config());
        gate.initialize().await.unwrap();

        let phase = gate.on_login_success(claims(&["other"])).unwrap();

        assert_eq!(phase, GatePhase::Unauthorized);
        assert!(gate.user().unwrap().groups.iter().all(|g| g != GROUP));
    }

    #[tokio::test]
    async fn sign_out_redirects_to_origin() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .returning(|| Ok(Some(claims(&[GROUP]))));
        provider
            .expect_sign_out()
            .withf(|redirect| redirect.to_string() == "http://localhost:3000")
            .times(1)
            .returning(|_| Ok(()));
        let mut gate = AuthGate::new(provider, &config());
        gate.initialize().await.unwrap();

        assert_eq!(gate.sign_out().await.unwrap(), "http://localhost:3000");
        assert_eq!(gate.phase(), GatePhase::Unauthenticated);
        assert!(gate.user().is_none());
    }

    #[tokio::test]
    async fn empty_required_group_denies_everyone() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_acquire_silent()
            .returning(|| Ok(Some(claims(&[GROUP]))));
        let mut gate = AuthGate::new(provider, &IdentityConfig::default());

        assert_eq!(gate.initialize().await.unwrap(), GatePhase::Unauthorized);
    }
}
