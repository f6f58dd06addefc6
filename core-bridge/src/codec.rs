//! Encoding of persisted values.
//!
//! Strings are stored verbatim and everything else as JSON. Reads try JSON
//! first and fall back to treating the raw text as a string, so both
//! structured values and plain strings written by older builds (or by the
//! REST layer, which reads `token` directly) round-trip.

use bridge_traits::BridgeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::types::CapabilityResult;

/// Serializes `value` for storage.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> CapabilityResult<String> {
    match serde_json::to_value(value)? {
        Value::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

/// Decodes a stored value, accepting both JSON and bare strings.
///
/// Fails with [`BridgeError::Decode`] when the text fits `T` neither way.
pub fn decode_value<T: DeserializeOwned>(raw: &str) -> CapabilityResult<T> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_json::from_value(Value::String(raw.to_string())).map_err(|_| {
            BridgeError::Decode(format!("stored value does not match expected shape: {json_err}"))
        }),
    }
}
