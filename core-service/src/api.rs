//! Session-aware glue for backend REST calls.
//!
//! The HTTP client belongs to the host. It asks [`ApiAuthorizer`] for the
//! `Authorization` header before each request and reports every response
//! status back; a 401 ends the session.

use std::sync::Arc;

use core_auth::{SessionManager, LOGIN_ROUTE};
use tracing::{debug, instrument};

pub const AUTHORIZATION_HEADER: &str = "Authorization";

pub const STATUS_UNAUTHORIZED: u16 = 401;

/// What the caller should do after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    /// Hand the response to the caller unchanged.
    Proceed,
    /// The session was dropped; navigate to [`redirect_route`](Self::redirect_route).
    RedirectToLogin,
}

impl ResponseDisposition {
    pub fn redirect_route(&self) -> Option<&'static str> {
        match self {
            ResponseDisposition::Proceed => None,
            ResponseDisposition::RedirectToLogin => Some(LOGIN_ROUTE),
        }
    }
}

#[derive(Clone)]
pub struct ApiAuthorizer {
    session: Arc<SessionManager>,
}

impl ApiAuthorizer {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// `("Authorization", "Bearer <token>")`, or `None` for anonymous
    /// requests.
    pub async fn authorization_header(&self) -> Option<(&'static str, String)> {
        self.session
            .authorization_header()
            .await
            .map(|value| (AUTHORIZATION_HEADER, value))
    }

    #[instrument(skip(self))]
    pub async fn handle_status(&self, status: u16) -> ResponseDisposition {
        if status != STATUS_UNAUTHORIZED {
            return ResponseDisposition::Proceed;
        }
        let route = self.session.handle_unauthorized().await;
        debug!(route, "Redirecting after 401");
        ResponseDisposition::RedirectToLogin
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use bridge_desktop::MemoryKeyValueStore;
    use bridge_traits::SystemClock;
    use core_auth::{AuthTokens, UserProfile};
    use core_runtime::config::SessionConfig;
    use core_runtime::events::EventBus;

    async fn signed_in() -> (ApiAuthorizer, Arc<SessionManager>) {
        let session = Arc::new(SessionManager::new(
            Arc::new(MemoryKeyValueStore::new()),
            SessionConfig::default(),
            EventBus::new(8),
            Arc::new(SystemClock),
        ));
        session
            .login(
                AuthTokens::bearer("jwt"),
                UserProfile::new("u-1", "eco@example.com", "Eco"),
            )
            .await
            .unwrap();
        (ApiAuthorizer::new(session.clone()), session)
    }

    #[tokio::test]
    async fn test_bearer_header_from_session() {
        let (authorizer, _session) = signed_in().await;

        assert_eq!(
            authorizer.authorization_header().await,
            Some(("Authorization", "Bearer jwt".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unauthorized_drops_session() {
        let (authorizer, session) = signed_in().await;

        assert_eq!(
            authorizer.handle_status(200).await,
            ResponseDisposition::Proceed
        );
        assert!(session.is_authenticated().await);

        let disposition = authorizer.handle_status(401).await;
        assert_eq!(disposition, ResponseDisposition::RedirectToLogin);
        assert_eq!(disposition.redirect_route(), Some("/login"));
        assert!(!session.is_authenticated().await);
        assert_eq!(authorizer.authorization_header().await, None);
    }
}
