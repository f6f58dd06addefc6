//! In-memory key-value store with multi-writer change notifications

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{KeyValueStore, StorageChange, StorageSubscription, StoreOrigin},
};
use core_async::sync::broadcast;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

const CHANGE_BUFFER: usize = 64;

struct Shared {
    items: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
    next_origin: AtomicU64,
}

/// Map-backed [`KeyValueStore`].
///
/// Every handle opened with [`open_peer`](Self::open_peer) shares the same
/// map and change feed but has its own origin, so a subscriber on one handle
/// only hears about writes made through the others. That is exactly how two
/// browser tabs on the same origin observe each other's `localStorage`.
///
/// Reads and writes can be made to fail per handle to simulate I/O errors.
pub struct MemoryKeyValueStore {
    shared: Arc<Shared>,
    origin: StoreOrigin,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        let shared = Arc::new(Shared {
            items: Mutex::new(HashMap::new()),
            changes,
            next_origin: AtomicU64::new(1),
        });
        Self::with_shared(shared)
    }

    fn with_shared(shared: Arc<Shared>) -> Self {
        let origin = shared.next_origin.fetch_add(1, Ordering::Relaxed);
        Self {
            shared,
            origin,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Another handle onto the same data, acting as a separate writer.
    pub fn open_peer(&self) -> Self {
        Self::with_shared(Arc::clone(&self.shared))
    }

    pub fn origin(&self) -> StoreOrigin {
        self.origin
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw contents, for assertions.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.shared.items.lock().clone()
    }

    fn check_writable(&self, operation: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BridgeError::Storage(format!(
                "Simulated {} failure",
                operation
            )));
        }
        Ok(())
    }

    fn publish(&self, key: Option<&str>, new_value: Option<&str>) {
        let change = StorageChange {
            key: key.map(str::to_string),
            new_value: new_value.map(str::to_string),
            origin: Some(self.origin),
        };
        // No subscribers is fine.
        let _ = self.shared.changes.send(change);
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BridgeError::Storage("Simulated read failure".to_string()));
        }
        Ok(self.shared.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable("write")?;
        self.shared
            .items
            .lock()
            .insert(key.to_string(), value.to_string());
        trace!(key, origin = self.origin, "memory store write");
        self.publish(Some(key), Some(value));
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.check_writable("remove")?;
        let existed = self.shared.items.lock().remove(key).is_some();
        if existed {
            self.publish(Some(key), None);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check_writable("clear")?;
        self.shared.items.lock().clear();
        self.publish(None, None);
        Ok(())
    }

    fn subscribe(&self) -> Option<StorageSubscription> {
        Some(StorageSubscription::new(
            self.shared.changes.subscribe(),
            Some(self.origin),
        ))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_peers_share_data() {
        let tab_a = MemoryKeyValueStore::new();
        let tab_b = tab_a.open_peer();

        tab_a.set_item("userProfile", r#"{"name":"X"}"#).await.unwrap();

        assert_eq!(
            tab_b.get_item("userProfile").await.unwrap().as_deref(),
            Some(r#"{"name":"X"}"#)
        );
        assert_ne!(tab_a.origin(), tab_b.origin());
    }

    #[tokio::test]
    async fn test_subscriber_sees_only_foreign_writes() {
        let tab_a = MemoryKeyValueStore::new();
        let tab_b = tab_a.open_peer();
        let mut feed = tab_b.subscribe().expect("memory store publishes changes");

        tab_b.set_item("theme", "dark").await.unwrap();
        tab_a.set_item("theme", "light").await.unwrap();

        let change = feed.next().await.expect("change");
        assert_eq!(change.key.as_deref(), Some("theme"));
        assert_eq!(change.new_value.as_deref(), Some("light"));
        assert_eq!(change.origin, Some(tab_a.origin()));
    }

    #[tokio::test]
    async fn test_clear_is_published_without_key() {
        let tab_a = MemoryKeyValueStore::new();
        let tab_b = tab_a.open_peer();
        let mut feed = tab_b.subscribe().unwrap();

        tab_a.clear().await.unwrap();

        let change = feed.next().await.unwrap();
        assert!(change.key.is_none());
        assert!(change.affects("anything"));
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let store = MemoryKeyValueStore::new();
        store.set_item("k", "v").await.unwrap();

        store.set_fail_writes(true);
        assert!(matches!(
            store.set_item("k", "w").await,
            Err(BridgeError::Storage(_))
        ));
        assert_eq!(store.snapshot().get("k").map(String::as_str), Some("v"));

        store.set_fail_reads(true);
        assert!(store.get_item("k").await.is_err());

        // Failures are per handle.
        let peer = store.open_peer();
        assert_eq!(peer.get_item("k").await.unwrap().as_deref(), Some("v"));
    }
}
