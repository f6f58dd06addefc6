//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors raised while talking to browser globals
#[derive(Error, Debug)]
pub enum WasmError {
    /// A browser global (`window`, `localStorage`) is missing
    #[error("{0} is not available")]
    NotAvailable(&'static str),

    /// JavaScript threw
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// The bridge object has no callable property with this name
    #[error("Bridge method {0} is missing or not a function")]
    MissingMethod(String),

    /// A native call returned a value of the wrong JavaScript type
    #[error("Bridge method {method} returned a non-{expected} value")]
    UnexpectedType {
        /// Host method name
        method: String,
        /// Expected JavaScript type
        expected: &'static str,
    },
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(js_error_message(&js_value))
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(what) => BridgeError::Unavailable(what.to_string()),
            WasmError::MissingMethod(method) => {
                BridgeError::native_call(method, "method is missing or not a function")
            }
            WasmError::UnexpectedType { method, expected } => {
                BridgeError::Decode(format!("{method} did not return a {expected}"))
            }
            WasmError::JavaScript(message) => BridgeError::Io(message),
        }
    }
}

/// Best-effort text for a thrown JavaScript value.
pub fn js_error_message(js_value: &JsValue) -> String {
    if let Some(text) = js_value.as_string() {
        text
    } else if let Some(error) = js_value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", js_value)
    }
}
