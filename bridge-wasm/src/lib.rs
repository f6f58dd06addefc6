//! WebAssembly Bridge Implementations
//!
//! Browser-side implementations of the traits defined in `bridge-traits`,
//! built on `web-sys`, `js-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It will not compile for native targets.
//!
//! # Implementations
//!
//! - `JsNativeBridge`: the Android shell's injected object as a `NativeBridge`
//! - `WindowPathProvider`: `window.Android` and `window.EcoLifeApp.AndroidBridge`
//! - `LocalStorageStore`: `localStorage` with cross-tab change events
//! - `ConsoleLoggerSink`: log forwarding to the developer console
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default())?;
//! // hand bridges.providers and bridges.fallback_store to the core config
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod js_bridge;
pub mod logger;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use error::{WasmError, WasmResult};
pub use js_bridge::JsNativeBridge;
pub use logger::ConsoleLoggerSink;
pub use providers::{default_providers, is_android_webview, WindowPathProvider};
pub use storage::LocalStorageStore;
