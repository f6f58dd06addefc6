//! Session lifecycle over a shared store, as a page reload would see it.

#![cfg(not(target_arch = "wasm32"))]

use std::sync::Arc;

use bridge_desktop::MemoryKeyValueStore;
use bridge_traits::{KeyValueStore, SystemClock};
use core_auth::{AuthState, AuthTokens, SessionManager, UserProfile, UserStatus};
use core_runtime::config::SessionConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};

fn eco_user() -> UserProfile {
    let mut user = UserProfile::new("u-42", "eco@example.com", "Eco Warrior");
    user.status = Some(UserStatus::Active);
    user
}

fn manager(store: &Arc<MemoryKeyValueStore>) -> (SessionManager, EventBus) {
    let bus = EventBus::new(16);
    let manager = SessionManager::new(
        store.clone(),
        SessionConfig::default(),
        bus.clone(),
        Arc::new(SystemClock),
    );
    (manager, bus)
}

#[tokio::test]
async fn test_login_then_logout_leaves_nothing_behind() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let (session, _bus) = manager(&store);
    session.init().await.unwrap();

    session
        .login(AuthTokens::bearer("jwt-1"), eco_user())
        .await
        .unwrap();
    assert!(session.is_authenticated().await);
    assert!(store.snapshot().contains_key("token"));
    assert!(store.snapshot().contains_key("user"));

    session.logout().await.unwrap();
    assert!(!session.is_authenticated().await);
    assert!(store.get_item("token").await.unwrap().is_none());
    assert!(store.get_item("user").await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_survives_reload() {
    let store = Arc::new(MemoryKeyValueStore::new());
    {
        let (session, _bus) = manager(&store);
        session.init().await.unwrap();
        session
            .login(AuthTokens::bearer("jwt-1"), eco_user())
            .await
            .unwrap();
    }

    let (reloaded, _bus) = manager(&store);
    let state = reloaded.init().await.unwrap();

    assert_eq!(
        state,
        AuthState::Authenticated {
            tokens: AuthTokens::bearer("jwt-1"),
            user: eco_user(),
        }
    );
    assert_eq!(reloaded.current_user().await, Some(eco_user()));
}

#[tokio::test]
async fn test_half_persisted_session_is_discarded() {
    let store = Arc::new(MemoryKeyValueStore::new());
    store
        .set_item("user", &serde_json::to_string(&eco_user()).unwrap())
        .await
        .unwrap();

    let (session, bus) = manager(&store);
    let mut events = bus.subscribe();

    assert_eq!(session.init().await.unwrap(), AuthState::Anonymous);
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::SessionIncomplete)
    );
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_raw_token_written_by_rest_layer_is_accepted() {
    let store = Arc::new(MemoryKeyValueStore::new());
    store.set_item("token", "eyJhbGciOi.payload.sig").await.unwrap();
    store
        .set_item("user", &serde_json::to_string(&eco_user()).unwrap())
        .await
        .unwrap();

    let (session, _bus) = manager(&store);
    session.init().await.unwrap();

    assert_eq!(
        session.authorization_header().await.as_deref(),
        Some("Bearer eyJhbGciOi.payload.sig")
    );
}

#[tokio::test]
async fn test_custom_keys_are_honoured() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let session = SessionManager::new(
        store.clone(),
        SessionConfig {
            token_key: "ecolife.token".into(),
            user_key: "ecolife.user".into(),
            track_expiry: false,
        },
        EventBus::new(4),
        Arc::new(SystemClock),
    );

    session
        .login(AuthTokens::bearer("jwt-2"), eco_user())
        .await
        .unwrap();

    let raw = store.snapshot();
    assert_eq!(raw["ecolife.token"], "jwt-2");
    assert!(raw.contains_key("ecolife.user"));
}
