//! Injection points on `window` where the Android shell may place its bridge.

use std::sync::Arc;

use bridge_traits::{BridgeProvider, NativeBridge};
use js_sys::Reflect;
use tracing::trace;
use wasm_bindgen::JsValue;

use crate::js_bridge::JsNativeBridge;

/// Looks up the bridge object at a fixed property path below `window`.
#[derive(Debug, Clone)]
pub struct WindowPathProvider {
    name: &'static str,
    path: &'static [&'static str],
}

impl WindowPathProvider {
    /// Provider for an arbitrary path, e.g. `&["EcoLifeApp", "AndroidBridge"]`.
    pub const fn new(name: &'static str, path: &'static [&'static str]) -> Self {
        Self { name, path }
    }

    /// `window.Android`, the primary injection point.
    pub const fn android() -> Self {
        Self::new("window.Android", &["Android"])
    }

    /// `window.EcoLifeApp.AndroidBridge`, the namespaced injection point.
    pub const fn eco_life_app() -> Self {
        Self::new("window.EcoLifeApp.AndroidBridge", &["EcoLifeApp", "AndroidBridge"])
    }

    fn resolve(&self) -> Option<JsValue> {
        let mut current: JsValue = web_sys::window()?.into();
        for segment in self.path {
            current = Reflect::get(&current, &JsValue::from_str(segment)).ok()?;
            if current.is_null() || current.is_undefined() {
                return None;
            }
        }
        current.is_object().then_some(current)
    }
}

impl BridgeProvider for WindowPathProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn probe(&self) -> Option<Arc<dyn NativeBridge>> {
        let found = self.resolve();
        trace!(provider = self.name, found = found.is_some(), "Probed window path");
        found.map(|target| Arc::new(JsNativeBridge::new(target)) as Arc<dyn NativeBridge>)
    }
}

/// Both injection points, `window.Android` first.
pub fn default_providers() -> Vec<Arc<dyn BridgeProvider>> {
    vec![
        Arc::new(WindowPathProvider::android()),
        Arc::new(WindowPathProvider::eco_life_app()),
    ]
}

/// True when the page runs inside the EcoLife Android WebView.
///
/// Only the namespaced injection point counts; `window.Android` alone is too
/// generic to identify the shell.
pub fn is_android_webview() -> bool {
    WindowPathProvider::eco_life_app().resolve().is_some()
}
