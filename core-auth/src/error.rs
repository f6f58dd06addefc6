use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session storage failed: {0}")]
    Storage(#[from] BridgeError),

    /// Only one half of the persisted session was found.
    #[error("Session incomplete: only the {present} entry was persisted")]
    SessionIncomplete { present: &'static str },

    /// A failed write could not be rolled back, so both entries were removed.
    #[error("Session discarded after a failed write: {0}")]
    SessionDiscarded(String),

    #[error("Failed to serialize {context}: {source}")]
    Serialization {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AuthError>;
