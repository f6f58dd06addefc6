//! Native bridge storage exposed as a [`KeyValueStore`], and backend selection.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::{BridgeError, KeyValueStore};
use core_runtime::config::StoragePreference;
use tracing::info;

use crate::facade::AndroidApi;

/// The shell's `saveToStorage` / `getFromStorage` family behind the
/// [`KeyValueStore`] contract.
///
/// The handle is resolved per call, so a store created before the bridge was
/// injected starts working as soon as it is. Native storage has no change
/// feed.
pub struct NativeKeyValueStore {
    api: Arc<AndroidApi>,
}

impl NativeKeyValueStore {
    pub fn new(api: Arc<AndroidApi>) -> Self {
        Self { api }
    }
}

fn storage_error(err: BridgeError) -> BridgeError {
    match err {
        BridgeError::Unavailable(_) | BridgeError::Storage(_) => err,
        other => BridgeError::Storage(other.to_string()),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl KeyValueStore for NativeKeyValueStore {
    async fn get_item(&self, key: &str) -> bridge_traits::error::Result<Option<String>> {
        let bridge = self.api.ensure_handle()?;
        let value = bridge.get_from_storage(key).map_err(storage_error)?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn set_item(&self, key: &str, value: &str) -> bridge_traits::error::Result<()> {
        let bridge = self.api.ensure_handle()?;
        bridge.save_to_storage(key, value).map_err(storage_error)
    }

    async fn remove_item(&self, key: &str) -> bridge_traits::error::Result<()> {
        let bridge = self.api.ensure_handle()?;
        bridge.remove_from_storage(key).map_err(storage_error)
    }

    async fn clear(&self) -> bridge_traits::error::Result<()> {
        let bridge = self.api.ensure_handle()?;
        bridge.clear_storage().map_err(storage_error)
    }

    fn backend_name(&self) -> &'static str {
        "native"
    }
}

/// Picks the store persisted values and the session use.
///
/// Native storage is chosen only for [`StoragePreference::PreferNative`] with
/// a bridge already attached; everything else gets `fallback`.
pub fn select_backend(
    api: &Arc<AndroidApi>,
    fallback: Arc<dyn KeyValueStore>,
    preference: StoragePreference,
) -> Arc<dyn KeyValueStore> {
    let store: Arc<dyn KeyValueStore> = match preference {
        StoragePreference::PreferNative if api.is_available() => {
            Arc::new(NativeKeyValueStore::new(Arc::clone(api)))
        }
        _ => fallback,
    };
    info!(backend = store.backend_name(), ?preference, "Storage backend selected");
    store
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use bridge_desktop::{MemoryKeyValueStore, RecordingBridge, SlotProvider};
    use bridge_traits::{BridgeProvider, SystemClock};

    fn api(bridge: Option<Arc<RecordingBridge>>) -> Arc<AndroidApi> {
        let provider = Arc::new(SlotProvider::new("window.Android"));
        if let Some(bridge) = bridge {
            provider.install(bridge);
        }
        let providers: Vec<Arc<dyn BridgeProvider>> = vec![provider];
        Arc::new(AndroidApi::new(providers, Arc::new(SystemClock)))
    }

    #[tokio::test]
    async fn test_native_store_round_trip() {
        let bridge = Arc::new(RecordingBridge::new());
        let store = NativeKeyValueStore::new(api(Some(bridge.clone())));

        store.set_item("user", "{}").await.unwrap();
        assert_eq!(bridge.stored("user").as_deref(), Some("{}"));
        assert_eq!(store.get_item("user").await.unwrap().as_deref(), Some("{}"));

        store.remove_item("user").await.unwrap();
        assert_eq!(store.get_item("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_native_failures_become_storage_errors() {
        let bridge = Arc::new(RecordingBridge::new());
        bridge.fail_on("saveToStorage");
        let store = NativeKeyValueStore::new(api(Some(bridge)));

        assert!(matches!(
            store.set_item("k", "v").await,
            Err(BridgeError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_absent_bridge_is_unavailable() {
        let store = NativeKeyValueStore::new(api(None));
        assert!(store.get_item("k").await.unwrap_err().is_unavailable());
    }

    #[test]
    fn test_select_backend() {
        let fallback: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let attached = api(Some(Arc::new(RecordingBridge::new())));
        let detached = api(None);

        let chosen = select_backend(&attached, fallback.clone(), StoragePreference::PreferNative);
        assert_eq!(chosen.backend_name(), "native");

        let chosen = select_backend(&attached, fallback.clone(), StoragePreference::FallbackOnly);
        assert_eq!(chosen.backend_name(), "memory");

        let chosen = select_backend(&detached, fallback, StoragePreference::PreferNative);
        assert_eq!(chosen.backend_name(), "memory");
    }
}
