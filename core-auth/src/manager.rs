//! # Session Manager
//!
//! Process-wide authentication state with an explicit lifecycle.
//!
//! ## Overview
//!
//! `SessionManager` owns the in-memory [`AuthState`] and keeps it in step with
//! the persisted session pair through a [`SessionStore`]. It starts in
//! [`AuthState::Unknown`] until [`init`](SessionManager::init) has read the
//! store, then moves between `Anonymous` and `Authenticated` on login, logout,
//! expiry and backend rejection. Every transition is published on the event
//! bus.
//!
//! ## Expiry
//!
//! With expiry tracking enabled an expired token is noticed lazily: the next
//! call to [`access_token`](SessionManager::access_token) or
//! [`is_authenticated`](SessionManager::is_authenticated) sees it. Only
//! `access_token` acts on it, by logging out. There is no background timer.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AuthTokens, SessionManager, UserProfile};
//! use core_runtime::config::SessionConfig;
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//! # use bridge_traits::{KeyValueStore, SystemClock};
//! # async fn example(store: Arc<dyn KeyValueStore>) -> core_auth::Result<()> {
//! let manager = SessionManager::new(
//!     store,
//!     SessionConfig::default(),
//!     EventBus::new(100),
//!     Arc::new(SystemClock),
//! );
//!
//! manager.init().await?;
//! manager
//!     .login(
//!         AuthTokens::bearer("jwt"),
//!         UserProfile::new("u-1", "eco@example.com", "Eco"),
//!     )
//!     .await?;
//! assert!(manager.is_authenticated().await);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::session_store::{SessionStore, StoredSession};
use crate::types::{AuthState, AuthTokens, UserProfile};
use bridge_traits::{Clock, KeyValueStore};
use core_async::sync::RwLock;
use core_runtime::config::SessionConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Route the view should navigate to after the backend rejects the session.
pub const LOGIN_ROUTE: &str = "/login";

pub struct SessionManager {
    store: SessionStore,
    state: RwLock<AuthState>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: SessionConfig,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: SessionStore::new(store, config),
            state: RwLock::new(AuthState::Unknown),
            event_bus,
            clock,
        }
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }

    fn tracks_expiry(&self) -> bool {
        self.store.config().track_expiry
    }

    fn is_expired(&self, tokens: &AuthTokens) -> bool {
        self.tracks_expiry() && tokens.is_expired_at(self.clock.unix_timestamp_millis())
    }

    /// Reads the persisted session and leaves `Unknown`.
    ///
    /// A half-persisted session is cleared and reported as
    /// [`AuthEvent::SessionIncomplete`]; an expired one is cleared and
    /// reported as [`AuthEvent::SessionExpired`]. Both end `Anonymous`. A
    /// storage read failure also ends `Anonymous` and is returned.
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<AuthState> {
        let loaded = match self.store.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                *self.state.write().await = AuthState::Anonymous;
                return Err(e);
            }
        };

        let next = match loaded {
            StoredSession::Empty => {
                debug!("No persisted session");
                AuthState::Anonymous
            }
            StoredSession::Incomplete { present } => {
                let err = AuthError::SessionIncomplete { present };
                warn!(error = %err, "Clearing incomplete session");
                self.clear_quietly().await;
                self.emit(AuthEvent::SessionIncomplete);
                AuthState::Anonymous
            }
            StoredSession::Complete { tokens, .. } if self.is_expired(&tokens) => {
                info!("Persisted session has expired");
                self.clear_quietly().await;
                self.emit(AuthEvent::SessionExpired);
                AuthState::Anonymous
            }
            StoredSession::Complete { tokens, user } => {
                info!(user_id = %user.id, "Restored persisted session");
                AuthState::Authenticated { tokens, user }
            }
        };

        *self.state.write().await = next.clone();
        Ok(next)
    }

    async fn clear_quietly(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear session entries");
        }
    }

    /// Persists the session (token first, then user) and becomes
    /// `Authenticated`.
    ///
    /// On failure the previous session, if any, is still persisted and the
    /// state is unchanged; the caller may retry. If storage could not be put
    /// back, the previous session is dropped and the state becomes
    /// `Anonymous`.
    #[instrument(skip(self, tokens, user), fields(user_id = %user.id))]
    pub async fn login(&self, tokens: AuthTokens, user: UserProfile) -> Result<()> {
        if let Err(e) = self.store.save(&tokens, &user).await {
            warn!(error = %e, "Login could not persist the session");
            if matches!(e, AuthError::SessionDiscarded(_)) {
                let mut state = self.state.write().await;
                if matches!(*state, AuthState::Authenticated { .. }) {
                    *state = AuthState::Anonymous;
                    drop(state);
                    self.emit(AuthEvent::SignedOut);
                }
            }
            return Err(AuthError::LoginFailed(e.to_string()));
        }

        let user_id = user.id.clone();
        *self.state.write().await = AuthState::Authenticated { tokens, user };

        info!("User signed in");
        self.emit(AuthEvent::SignedIn { user_id });
        Ok(())
    }

    /// Removes both persisted entries and becomes `Anonymous`.
    ///
    /// The in-memory state is cleared even when storage removal fails; the
    /// storage error is still returned.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let cleared = self.store.clear().await;
        *self.state.write().await = AuthState::Anonymous;

        info!("User signed out");
        self.emit(AuthEvent::SignedOut);
        cleared
    }

    /// Rewrites the persisted profile under the existing token.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update_user_info(&self, user: UserProfile) -> Result<()> {
        let mut state = self.state.write().await;
        let AuthState::Authenticated { user: current, .. } = &mut *state else {
            return Err(AuthError::NotAuthenticated);
        };

        self.store.save_user(&user).await?;
        let user_id = user.id.clone();
        *current = user;
        drop(state);

        debug!("User profile updated");
        self.emit(AuthEvent::ProfileUpdated { user_id });
        Ok(())
    }

    /// Replaces the credentials of the current session.
    #[instrument(skip(self, tokens))]
    pub async fn update_tokens(&self, tokens: AuthTokens) -> Result<()> {
        let mut state = self.state.write().await;
        let AuthState::Authenticated { tokens: current, .. } = &mut *state else {
            return Err(AuthError::NotAuthenticated);
        };

        self.store.save_tokens(&tokens).await?;
        *current = tokens;
        drop(state);

        debug!("Auth tokens updated");
        self.emit(AuthEvent::TokensUpdated);
        Ok(())
    }

    /// True when a token and a user are held and the token has not expired.
    pub async fn is_authenticated(&self) -> bool {
        match &*self.state.read().await {
            AuthState::Authenticated { tokens, .. } => !self.is_expired(tokens),
            _ => false,
        }
    }

    /// Current access token.
    ///
    /// An expired token logs the session out and yields `None`.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Option<String> {
        let tokens = self.state.read().await.tokens().cloned()?;

        if self.is_expired(&tokens) {
            info!("Access token expired, signing out");
            if let Err(e) = self.logout().await {
                warn!(error = %e, "Logout after expiry did not clear storage");
            }
            self.emit(AuthEvent::SessionExpired);
            return None;
        }

        Some(tokens.access_token)
    }

    /// `Authorization` header value for backend requests.
    pub async fn authorization_header(&self) -> Option<String> {
        self.access_token()
            .await
            .map(|token| format!("Bearer {}", token))
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.state.read().await.user().cloned()
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// True until [`init`](Self::init) has completed.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    /// Forced logout after the backend rejected the bearer token.
    ///
    /// Returns the route the view should navigate to.
    #[instrument(skip(self))]
    pub async fn handle_unauthorized(&self) -> &'static str {
        warn!("Backend rejected credentials, forcing logout");
        if let Err(e) = self.logout().await {
            warn!(error = %e, "Forced logout did not clear storage");
        }
        self.emit(AuthEvent::Unauthorized {
            redirect_to: LOGIN_ROUTE.to_string(),
        });
        LOGIN_ROUTE
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
