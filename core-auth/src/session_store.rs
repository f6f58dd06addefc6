//! Persistence of the session pair (access token, user profile).
//!
//! The two halves live under separate keys of a [`KeyValueStore`] so the REST
//! layer can read the token without decoding the profile. Writes are
//! sequential, token first; a failed profile write rolls the token back.
//!
//! ## Token encoding
//!
//! With expiry tracking enabled the token key holds the JSON form of
//! [`AuthTokens`]. Without it the key holds the raw access token. Reads accept
//! either form, so switching the setting does not strand an existing session.

use crate::error::{AuthError, Result};
use crate::types::{AuthTokens, UserProfile};
use bridge_traits::KeyValueStore;
use core_runtime::config::SessionConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What was found under the session keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSession {
    Empty,
    Complete {
        tokens: AuthTokens,
        user: UserProfile,
    },
    /// Exactly one half survived. `present` names it ("token" or "user").
    Incomplete { present: &'static str },
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: SessionConfig) -> Self {
        debug!(
            backend = store.backend_name(),
            token_key = %config.token_key,
            user_key = %config.user_key,
            "Initializing SessionStore"
        );
        Self { store, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Reads both halves of the session.
    ///
    /// Entries that cannot be decoded are deleted and treated as absent.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<StoredSession> {
        let tokens = self.load_tokens().await?;
        let user = self.load_user().await?;

        Ok(match (tokens, user) {
            (Some(tokens), Some(user)) => StoredSession::Complete { tokens, user },
            (None, None) => StoredSession::Empty,
            (Some(_), None) => StoredSession::Incomplete { present: "token" },
            (None, Some(_)) => StoredSession::Incomplete { present: "user" },
        })
    }

    async fn load_tokens(&self) -> Result<Option<AuthTokens>> {
        let key = &self.config.token_key;
        let Some(raw) = self.store.get_item(key).await? else {
            return Ok(None);
        };

        match decode_tokens(&raw) {
            Some(tokens) => Ok(Some(tokens)),
            None => {
                warn!(key = %key, "Discarding unreadable session token");
                self.discard(key).await;
                Ok(None)
            }
        }
    }

    async fn load_user(&self) -> Result<Option<UserProfile>> {
        let key = &self.config.user_key;
        let Some(raw) = self.store.get_item(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding corrupted user profile");
                self.discard(key).await;
                Ok(None)
            }
        }
    }

    async fn discard(&self, key: &str) {
        if let Err(e) = self.store.remove_item(key).await {
            warn!(key = %key, error = %e, "Failed to delete corrupted session entry");
        }
    }

    /// Persists a full session: token, then user.
    ///
    /// If the user write fails the token entry is put back the way it was, so
    /// a previous session stays whole and an empty store stays empty. When
    /// that rollback fails too, both entries are removed and
    /// [`AuthError::SessionDiscarded`] is returned.
    #[instrument(skip(self, tokens, user), fields(user_id = %user.id))]
    pub async fn save(&self, tokens: &AuthTokens, user: &UserProfile) -> Result<()> {
        let token_key = &self.config.token_key;
        let previous = self.store.get_item(token_key).await?;

        self.save_tokens(tokens).await?;

        if let Err(e) = self.save_user(user).await {
            warn!(error = %e, "User write failed, rolling back token");
            let restored = match &previous {
                Some(raw) => self.store.set_item(token_key, raw).await,
                None => self.store.remove_item(token_key).await,
            };

            if let Err(rollback) = restored {
                warn!(error = %rollback, "Token rollback failed, discarding session");
                if let Err(clear) = self.clear().await {
                    warn!(error = %clear, "Failed to discard session entries");
                }
                return Err(AuthError::SessionDiscarded(e.to_string()));
            }
            return Err(e);
        }

        info!(backend = self.store.backend_name(), "Session persisted");
        Ok(())
    }

    #[instrument(skip(self, tokens))]
    pub async fn save_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        let encoded = self.encode_tokens(tokens)?;
        self.store
            .set_item(&self.config.token_key, &encoded)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to persist session token");
                AuthError::from(e)
            })
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn save_user(&self, user: &UserProfile) -> Result<()> {
        let encoded = serde_json::to_string(user).map_err(|source| AuthError::Serialization {
            context: "user profile",
            source,
        })?;
        self.store
            .set_item(&self.config.user_key, &encoded)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to persist user profile");
                AuthError::from(e)
            })
    }

    /// Removes both entries, token first.
    ///
    /// A failed token removal stops before the user entry is touched, so the
    /// pair stays whole and the call can be retried. A user entry left behind
    /// by a later failure loads as [`StoredSession::Incomplete`].
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        if let Err(e) = self.store.remove_item(&self.config.token_key).await {
            warn!(error = %e, "Failed to remove session token, keeping session");
            return Err(e.into());
        }

        if let Err(e) = self.store.remove_item(&self.config.user_key).await {
            warn!(error = %e, "Failed to remove user profile");
            return Err(e.into());
        }

        info!("Session entries removed");
        Ok(())
    }

    fn encode_tokens(&self, tokens: &AuthTokens) -> Result<String> {
        if self.config.track_expiry {
            serde_json::to_string(tokens).map_err(|source| AuthError::Serialization {
                context: "auth tokens",
                source,
            })
        } else {
            Ok(tokens.access_token.clone())
        }
    }
}

/// Accepts both the JSON form and a bare access token.
fn decode_tokens(raw: &str) -> Option<AuthTokens> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).ok();
    }
    Some(AuthTokens::bearer(trimmed))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use bridge_desktop::MemoryKeyValueStore;

    fn user() -> UserProfile {
        UserProfile::new("u-1", "eco@example.com", "Eco")
    }

    fn store_with(config: SessionConfig) -> (Arc<MemoryKeyValueStore>, SessionStore) {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = SessionStore::new(backend.clone(), config);
        (backend, store)
    }

    #[test]
    fn test_decode_tokens_accepts_both_forms() {
        assert_eq!(decode_tokens("abc.def"), Some(AuthTokens::bearer("abc.def")));
        assert_eq!(
            decode_tokens(r#"{"accessToken":"abc","expiresAt":5}"#),
            Some(AuthTokens::bearer("abc").with_expires_at(5))
        );
        assert_eq!(decode_tokens("{broken"), None);
        assert_eq!(decode_tokens("  "), None);
    }

    #[tokio::test]
    async fn test_save_and_load_with_expiry_tracking() {
        let (backend, store) = store_with(SessionConfig::default());
        let tokens = AuthTokens::bearer("abc").with_expires_at(42);

        store.save(&tokens, &user()).await.unwrap();

        let raw = backend.snapshot();
        assert!(raw["token"].contains("\"expiresAt\":42"));
        assert_eq!(
            store.load().await.unwrap(),
            StoredSession::Complete {
                tokens,
                user: user()
            }
        );
    }

    #[tokio::test]
    async fn test_raw_token_without_expiry_tracking() {
        let config = SessionConfig {
            track_expiry: false,
            ..SessionConfig::default()
        };
        let (backend, store) = store_with(config);

        store
            .save(&AuthTokens::bearer("abc").with_expires_at(42), &user())
            .await
            .unwrap();

        assert_eq!(backend.snapshot()["token"], "abc");
        match store.load().await.unwrap() {
            StoredSession::Complete { tokens, .. } => assert_eq!(tokens.expires_at, None),
            other => panic!("expected a complete session, got {other:?}"),
        }
    }

    /// Rejects writes and removals of chosen keys and delegates everything
    /// else.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryKeyValueStore,
        rejected_write: Option<&'static str>,
        rejected_removal: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn get_item(&self, key: &str) -> bridge_traits::error::Result<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> bridge_traits::error::Result<()> {
            if self.rejected_write == Some(key) {
                return Err(bridge_traits::BridgeError::Storage("quota exceeded".into()));
            }
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> bridge_traits::error::Result<()> {
            if self.rejected_removal == Some(key) {
                return Err(bridge_traits::BridgeError::Storage("disk I/O error".into()));
            }
            self.inner.remove_item(key).await
        }

        async fn clear(&self) -> bridge_traits::error::Result<()> {
            self.inner.clear().await
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_user_write_failure_rolls_back_token() {
        let backend = Arc::new(FailingStore {
            rejected_write: Some("user"),
            ..FailingStore::default()
        });
        let store = SessionStore::new(backend.clone(), SessionConfig::default());

        let err = store
            .save(&AuthTokens::bearer("abc"), &user())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Storage(_)));
        assert!(backend.inner.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failed_relogin_restores_previous_token() {
        let backend = Arc::new(FailingStore {
            rejected_write: Some("user"),
            ..FailingStore::default()
        });
        let store = SessionStore::new(backend.clone(), SessionConfig::default());
        let first = AuthTokens::bearer("first");
        let first_raw = serde_json::to_string(&first).unwrap();
        backend.inner.set_item("token", &first_raw).await.unwrap();
        backend
            .inner
            .set_item("user", &serde_json::to_string(&user()).unwrap())
            .await
            .unwrap();

        let second = UserProfile::new("u-2", "other@example.com", "Other");
        let err = store
            .save(&AuthTokens::bearer("second"), &second)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Storage(_)));
        assert_eq!(backend.inner.snapshot()["token"], first_raw);
        assert_eq!(
            store.load().await.unwrap(),
            StoredSession::Complete {
                tokens: first,
                user: user()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_token_removal_keeps_both_entries() {
        let backend = Arc::new(FailingStore {
            rejected_removal: Some("token"),
            ..FailingStore::default()
        });
        let store = SessionStore::new(backend.clone(), SessionConfig::default());
        store.save(&AuthTokens::bearer("abc"), &user()).await.unwrap();

        assert!(matches!(store.clear().await, Err(AuthError::Storage(_))));

        let raw = backend.inner.snapshot();
        assert!(raw.contains_key("token"));
        assert!(raw.contains_key("user"));
        assert!(matches!(
            store.load().await.unwrap(),
            StoredSession::Complete { .. }
        ));
    }

    #[tokio::test]
    async fn test_one_half_is_incomplete() {
        let (backend, store) = store_with(SessionConfig::default());
        backend.set_item("token", "abc").await.unwrap();

        assert_eq!(
            store.load().await.unwrap(),
            StoredSession::Incomplete { present: "token" }
        );
    }

    #[tokio::test]
    async fn test_corrupted_user_is_deleted() {
        let (backend, store) = store_with(SessionConfig::default());
        backend.set_item("token", "abc").await.unwrap();
        backend.set_item("user", "{not json").await.unwrap();

        assert_eq!(
            store.load().await.unwrap(),
            StoredSession::Incomplete { present: "token" }
        );
        assert!(!backend.snapshot().contains_key("user"));
    }

    #[tokio::test]
    async fn test_clear_removes_both() {
        let (backend, store) = store_with(SessionConfig::default());
        store.save(&AuthTokens::bearer("abc"), &user()).await.unwrap();

        store.clear().await.unwrap();
        assert!(backend.snapshot().is_empty());
        assert_eq!(store.load().await.unwrap(), StoredSession::Empty);
    }
}
