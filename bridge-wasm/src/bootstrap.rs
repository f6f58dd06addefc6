//! Convenience helpers for wiring the wasm bridge implementations together.
//!
//! Host pages call [`build_wasm_bridges`] once at startup and hand the result
//! to `core-service`. It plays the role `bridge-desktop` plays for native
//! targets: one entry point that assembles every trait object the core needs
//! from browser globals.

use std::sync::Arc;

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeProvider, KeyValueStore, LogLevel, LoggerSink};
use tracing::info;

use crate::logger::ConsoleLoggerSink;
use crate::providers::default_providers;
use crate::storage::LocalStorageStore;

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Key prefix for `localStorage`. Empty keeps keys unprefixed.
    pub namespace: String,
    /// Look for the Android shell's bridge objects on `window`.
    pub detect_native_bridge: bool,
    /// Threshold of the console logger sink.
    pub console_level: LogLevel,
}

impl WasmBridgeConfig {
    /// Config with the given storage namespace and default settings.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            detect_native_bridge: true,
            console_level: LogLevel::Info,
        }
    }

    /// Plain browser: no native provider lookups.
    pub fn browser_only(mut self) -> Self {
        self.detect_native_bridge = false;
        self
    }

    /// Override the console logger threshold.
    pub fn with_console_level(mut self, level: LogLevel) -> Self {
        self.console_level = level;
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// Native bridge lookup strategies, `window.Android` first.
    pub providers: Vec<Arc<dyn BridgeProvider>>,
    /// `localStorage`, used whenever native storage is not selected.
    pub fallback_store: Arc<dyn KeyValueStore>,
    /// Console output for forwarded log entries.
    pub logger_sink: Arc<dyn LoggerSink>,
}

/// Build the default wasm bridge stack.
pub fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let providers = if config.detect_native_bridge {
        default_providers()
    } else {
        Vec::new()
    };
    let fallback_store: Arc<dyn KeyValueStore> =
        Arc::new(LocalStorageStore::with_namespace(&config.namespace)?);
    let logger_sink: Arc<dyn LoggerSink> = Arc::new(ConsoleLoggerSink::new(config.console_level));

    info!(
        providers = providers.len(),
        namespace = %config.namespace,
        "Wasm bridges assembled"
    );

    Ok(WasmBridgeSet {
        providers,
        fallback_store,
        logger_sink,
    })
}
