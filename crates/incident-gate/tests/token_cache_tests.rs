//! Token cache provider driving a real gate

use incident_gate::{AuthGate, GatePhase, GateView, IdentityProvider, ProviderError, TokenCacheProvider};
use incident_test_utils::{identity_config, mint_id_token, token_claims, TEST_GROUP};
use pretty_assertions::assert_eq;
use serde_json::json;

fn provider_in(dir: &tempfile::TempDir) -> TokenCacheProvider {
    TokenCacheProvider::new(&identity_config()).with_cache_path(dir.path().join("id_token"))
}

#[tokio::test]
async fn no_cache_means_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut gate = AuthGate::new(provider_in(&dir), &identity_config());

    assert_eq!(gate.initialize().await.unwrap(), GatePhase::Unauthenticated);
    assert_eq!(gate.view(), GateView::LoginPrompt);
}

#[tokio::test]
async fn login_caches_token_for_next_silent_auth() {
    let dir = tempfile::tempdir().unwrap();
    let token = mint_id_token(&token_claims("Ada", &[TEST_GROUP]));

    let provider = provider_in(&dir);
    provider.supply_token(&token);
    let mut gate = AuthGate::new(provider, &identity_config());
    assert_eq!(gate.login().await.unwrap(), GatePhase::Authorized);
    assert!(dir.path().join("id_token").exists());

    let mut next = AuthGate::new(provider_in(&dir), &identity_config());
    assert_eq!(next.initialize().await.unwrap(), GatePhase::Authorized);
    assert_eq!(next.user().unwrap().display_name(), "Ada");
}

#[tokio::test]
async fn token_without_group_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let provider = provider_in(&dir);
    provider.supply_token(mint_id_token(&token_claims("Bob", &["grp-other"])));
    let mut gate = AuthGate::new(provider, &identity_config());

    assert_eq!(gate.login().await.unwrap(), GatePhase::Unauthorized);
    assert!(matches!(
        gate.view(),
        GateView::AccessDenied { policy, user } if policy.requirement() == TEST_GROUP
            && user.display_name() == "Bob"
    ));
}

#[tokio::test]
async fn tokens_for_other_clients_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut claims = token_claims("Eve", &[TEST_GROUP]);
    claims["aud"] = json!("someone-else");

    let provider = provider_in(&dir);
    provider.supply_token(mint_id_token(&claims));
    let mut gate = AuthGate::new(provider, &identity_config());

    assert!(gate.login().await.is_err());
    assert_eq!(gate.phase(), GatePhase::Unauthenticated);
    assert!(!dir.path().join("id_token").exists());
}

#[tokio::test]
async fn expired_cached_token_leaves_gate_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let mut claims = token_claims("Ada", &[TEST_GROUP]);
    claims["exp"] = json!(1_000_000_000_u64);
    std::fs::write(dir.path().join("id_token"), mint_id_token(&claims)).unwrap();

    let provider = provider_in(&dir);
    assert!(matches!(
        provider.acquire_silent().await,
        Err(ProviderError::InvalidToken(_))
    ));

    let mut gate = AuthGate::new(provider, &identity_config());
    assert_eq!(gate.initialize().await.unwrap(), GatePhase::Unauthenticated);
}

#[tokio::test]
async fn login_without_token_requires_interaction() {
    let dir = tempfile::tempdir().unwrap();
    let provider = provider_in(&dir);

    assert!(matches!(
        provider.login_interactive().await,
        Err(ProviderError::InteractionRequired(_))
    ));
}

#[tokio::test]
async fn sign_out_removes_cache() {
    let dir = tempfile::tempdir().unwrap();
    let provider = provider_in(&dir);
    provider.supply_token(mint_id_token(&token_claims("Ada", &[TEST_GROUP])));
    let mut gate = AuthGate::new(provider, &identity_config());
    gate.login().await.unwrap();

    let redirect = gate.sign_out().await.unwrap();

    assert_eq!(redirect, "http://localhost:3000");
    assert_eq!(gate.phase(), GatePhase::Unauthenticated);
    assert!(!dir.path().join("id_token").exists());

    // Signing out twice is harmless
    assert!(gate.sign_out().await.is_ok());
}
