use bridge_traits::{native::NativeBridge, provider::BridgeProvider};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Provider whose handle is installed at runtime.
///
/// Starts empty, the way a WebView page starts before the shell has injected
/// its bridge object. `install` fills the slot from any thread.
pub struct SlotProvider {
    name: String,
    slot: RwLock<Option<Arc<dyn NativeBridge>>>,
}

impl SlotProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: RwLock::new(None),
        }
    }

    /// Provider that is populated from the start.
    pub fn with_bridge(name: impl Into<String>, bridge: Arc<dyn NativeBridge>) -> Self {
        let provider = Self::new(name);
        provider.install(bridge);
        provider
    }

    pub fn install(&self, bridge: Arc<dyn NativeBridge>) {
        debug!(provider = %self.name, "bridge installed");
        *self.slot.write() = Some(bridge);
    }

    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    pub fn is_installed(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl BridgeProvider for SlotProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> Option<Arc<dyn NativeBridge>> {
        self.slot.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingBridge;
    use bridge_traits::provider::probe_in_order;

    #[test]
    fn test_empty_until_installed() {
        let provider = SlotProvider::new("window.Android");
        assert!(provider.probe().is_none());

        provider.install(Arc::new(RecordingBridge::new()));
        assert!(provider.is_installed());
        assert!(provider.probe().is_some());

        provider.clear();
        assert!(provider.probe().is_none());
    }

    #[test]
    fn test_first_populated_provider_wins() {
        let primary: Arc<dyn BridgeProvider> = Arc::new(SlotProvider::new("window.Android"));
        let secondary: Arc<dyn BridgeProvider> = Arc::new(SlotProvider::with_bridge(
            "window.EcoLifeApp.AndroidBridge",
            Arc::new(RecordingBridge::new()),
        ));

        let (name, _) = probe_in_order(&[primary, secondary]).expect("secondary resolves");
        assert_eq!(name, "window.EcoLifeApp.AndroidBridge");
    }
}
