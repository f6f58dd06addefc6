use thiserror::Error;

/// Failure taxonomy shared by every bridge and storage adapter.
///
/// None of these are fatal: the façade converts each of them into a
/// structured failure value, and "key not present" is never an error at all
/// (adapters return `Ok(None)` for it).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No native handle could be found by any provider.
    #[error("Bridge unavailable: {0}")]
    Unavailable(String),

    /// A handle was found but the native primitive raised.
    #[error("Native call {method} failed: {message}")]
    NativeCall { method: String, message: String },

    /// A persistent read, write, remove or clear was unsuccessful.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl BridgeError {
    pub fn native_call(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NativeCall {
            method: method.into(),
            message: message.into(),
        }
    }

    /// True for the expected "no bridge injected" condition.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
