use crate::error::GateError;

/// Authentication phase of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatePhase {
    /// No session
    Unauthenticated,
    /// Silent or interactive authentication in flight
    Authenticating,
    /// Signed in without the required membership
    Unauthorized,
    /// Signed in with the required membership
    Authorized,
}

impl GatePhase {
    /// Whether a user is signed in, authorized or not
    #[inline]
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Authorized)
    }
}

/// Validates a phase transition.
///
/// # Errors
/// `GateError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: GatePhase, to: GatePhase) -> Result<(), GateError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(GateError::IllegalTransition { from, to })
    }
}

/// Phases reachable from `from`.
///
/// Login-success events may arrive in any phase and resolve straight to
/// an authorization decision.
#[must_use]
pub fn allowed_transitions(from: GatePhase) -> Vec<GatePhase> {
    use GatePhase::*;
    match from {
        Unauthenticated => vec![Authenticating, Unauthorized, Authorized],
        Authenticating => vec![Unauthenticated, Unauthorized, Authorized],
        Unauthorized => vec![Unauthenticated, Authenticating, Unauthorized, Authorized],
        Authorized => vec![Unauthenticated, Unauthorized, Authorized],
    }
}
