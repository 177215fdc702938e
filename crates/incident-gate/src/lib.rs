//! Incident Gate - authentication state and authorization decision
//!
//! Provides:
//! - An explicit phase machine: unauthenticated, authenticating,
//!   unauthorized, authorized
//! - Group membership (or, when enabled, app role) authorization from ID
//!   token claims
//! - A render contract that evaluates protected content only when
//!   authorized
//! - A token-cache provider for command-line sessions
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_gate::{AuthGate, GateView, TokenCacheProvider};
//!
//! let mut gate = AuthGate::new(TokenCacheProvider::new(&identity), &identity);
//! gate.initialize().await?;
//! match gate.render(|user| run_workbench(user)) {
//!     GateView::Protected(output) => output,
//!     GateView::AccessDenied { policy, .. } => eprintln!("Access restricted. {policy}"),
//!     _ => eprintln!("Sign in first"),
//! }
//! ```

#![warn(unreachable_pub)]

pub mod claims;
pub mod error;
pub mod gate;
pub mod policy;
pub mod provider;
pub mod state;
pub mod token_cache;

pub use claims::{IdTokenClaims, UserInfo};
pub use error::{GateError, ProviderError};
pub use gate::{AuthGate, GateView};
pub use policy::AccessPolicy;
pub use provider::IdentityProvider;
pub use state::{allowed_transitions, validate_transition, GatePhase};
pub use token_cache::TokenCacheProvider;
