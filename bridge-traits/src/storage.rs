//! Key-value storage abstraction.
//!
//! Hooks persist string values under string keys and do not care which
//! backend holds them: the native bridge's storage, the browser's
//! `localStorage`, SQLite on desktop, or an in-memory map in tests.
//!
//! Backends that are shared between several writers (browser tabs on the same
//! origin) can also publish [`StorageChange`] notifications so readers can
//! resynchronize without polling.

use core_async::sync::broadcast;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Identifies the writer that produced a [`StorageChange`].
pub type StoreOrigin = u64;

/// Notification that a key was changed by some writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Changed key; `None` means the whole storage area was cleared.
    pub key: Option<String>,
    /// New raw value; `None` means the key was removed.
    pub new_value: Option<String>,
    /// Writer identity, when the backend knows it. Browser `storage` events
    /// always come from another tab and carry `None`.
    pub origin: Option<StoreOrigin>,
}

impl StorageChange {
    /// Whether this change affects `key` (directly or by a clear).
    pub fn affects(&self, key: &str) -> bool {
        match &self.key {
            Some(changed) => changed == key,
            None => true,
        }
    }
}

/// Receiver side of a backend's change feed.
///
/// Changes published by the subscribing handle itself are filtered out, so a
/// subscriber only ever sees foreign writes.
pub struct StorageSubscription {
    receiver: broadcast::Receiver<StorageChange>,
    local_origin: Option<StoreOrigin>,
}

impl StorageSubscription {
    pub fn new(
        receiver: broadcast::Receiver<StorageChange>,
        local_origin: Option<StoreOrigin>,
    ) -> Self {
        Self {
            receiver,
            local_origin,
        }
    }

    /// Waits for the next foreign change. Returns `None` once the backend has
    /// been dropped.
    ///
    /// A lagged receiver skips the overwritten notifications; callers react to
    /// the latest value anyway.
    pub async fn next(&mut self) -> Option<StorageChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => {
                    if change.origin.is_some() && change.origin == self.local_origin {
                        continue;
                    }
                    return Some(change);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// String key-value persistence.
///
/// Absent keys are `Ok(None)`, never an error. Implementations report every
/// other failure as [`BridgeError::Storage`](crate::error::BridgeError::Storage)
/// or [`BridgeError::Unavailable`](crate::error::BridgeError::Unavailable).
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember_tab(store: &dyn KeyValueStore) -> bridge_traits::error::Result<()> {
///     store.set_item("lastTab", "missions").await?;
///     assert_eq!(store.get_item("lastTab").await?.as_deref(), Some("missions"));
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait KeyValueStore: PlatformSendSync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Removes every key owned by this store.
    async fn clear(&self) -> Result<()>;

    async fn has_item(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key).await?.is_some())
    }

    /// Feed of changes made by other writers, if the backend is shared.
    fn subscribe(&self) -> Option<StorageSubscription> {
        None
    }

    /// Backend name for diagnostics.
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_affects_key_or_clear() {
        let single = StorageChange {
            key: Some("userProfile".into()),
            new_value: Some("{}".into()),
            origin: None,
        };
        assert!(single.affects("userProfile"));
        assert!(!single.affects("token"));

        let cleared = StorageChange {
            key: None,
            new_value: None,
            origin: None,
        };
        assert!(cleared.affects("token"));
    }

    #[tokio::test]
    async fn test_subscription_skips_own_writes() {
        let (tx, rx) = broadcast::channel(8);
        let mut subscription = StorageSubscription::new(rx, Some(1));

        tx.send(StorageChange {
            key: Some("k".into()),
            new_value: Some("mine".into()),
            origin: Some(1),
        })
        .unwrap();
        tx.send(StorageChange {
            key: Some("k".into()),
            new_value: Some("theirs".into()),
            origin: Some(2),
        })
        .unwrap();

        let change = subscription.next().await.expect("change");
        assert_eq!(change.new_value.as_deref(), Some("theirs"));

        drop(tx);
        assert!(subscription.next().await.is_none());
    }
}
