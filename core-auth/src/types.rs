//! Session data: credentials, the signed-in profile and the session state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// Profile of the signed-in user, as returned by the backend login and
/// profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            profile_image_url: None,
            is_verified: false,
            status: None,
            created_at: String::new(),
            updated_at: None,
        }
    }
}

/// Backend credentials.
///
/// `expires_at` is an absolute Unix timestamp in milliseconds. Tokens without
/// one never expire locally; the backend may still reject them with a 401.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl AuthTokens {
    /// Bare access token with no refresh token and no expiry.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at_ms: i64) -> Self {
        self.expires_at = Some(expires_at_ms);
        self
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now_ms >= expires_at)
    }
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session lifecycle.
///
/// ```text
/// Unknown ──init──> Authenticated ──logout / expiry / 401──> Anonymous
///    │                    ^                                      │
///    └──────init────> Anonymous ─────────────login───────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Persisted session not read yet
    #[default]
    Unknown,
    Anonymous,
    Authenticated {
        tokens: AuthTokens,
        user: UserProfile,
    },
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Unknown)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn tokens(&self) -> Option<&AuthTokens> {
        match self {
            AuthState::Authenticated { tokens, .. } => Some(tokens),
            _ => None,
        }
    }
}
