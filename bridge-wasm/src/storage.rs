//! `localStorage` as a [`KeyValueStore`], with cross-tab change notifications.
//!
//! The browser fires a `storage` event on every *other* document of the same
//! origin when a key changes. The store turns those events into
//! [`StorageChange`]s so persisted values can follow writes made in another
//! tab. An optional namespace prefixes keys as `"{namespace}::{key}"`; the
//! default empty namespace leaves keys untouched so `token` / `user` stay
//! readable by plain JavaScript.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{KeyValueStore, StorageChange, StorageSubscription};
use core_async::sync::broadcast;
use tracing::{debug, trace, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::error::{js_error_message, WasmError};

const CHANGE_BUFFER: usize = 64;

fn storage_error(context: &str, err: wasm_bindgen::JsValue) -> BridgeError {
    BridgeError::Storage(format!(
        "localStorage {context}: {}",
        js_error_message(&err)
    ))
}

fn local_storage(window: &web_sys::Window) -> BridgeResult<web_sys::Storage> {
    window
        .local_storage()
        .map_err(|err| storage_error("access", err))?
        .ok_or_else(|| WasmError::NotAvailable("localStorage").into())
}

fn key_prefix(namespace: &str) -> Option<String> {
    (!namespace.is_empty()).then(|| format!("{namespace}::"))
}

/// Browser `localStorage` scoped to an optional namespace.
pub struct LocalStorageStore {
    window: web_sys::Window,
    storage: web_sys::Storage,
    prefix: Option<String>,
    changes: broadcast::Sender<StorageChange>,
    listener: Closure<dyn FnMut(web_sys::StorageEvent)>,
}

impl LocalStorageStore {
    /// Opens `localStorage` without a namespace.
    pub fn new() -> BridgeResult<Self> {
        Self::with_namespace("")
    }

    /// Opens `localStorage`, prefixing every key with `"{namespace}::"`.
    pub fn with_namespace(namespace: &str) -> BridgeResult<Self> {
        let window = web_sys::window().ok_or(WasmError::NotAvailable("window"))?;
        let storage = local_storage(&window)?;
        let prefix = key_prefix(namespace);
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);

        let listener = {
            let changes = changes.clone();
            let prefix = prefix.clone();
            Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
                let key = match (event.key(), prefix.as_deref()) {
                    // Whole area cleared
                    (None, _) => None,
                    (Some(key), None) => Some(key),
                    (Some(key), Some(prefix)) => match key.strip_prefix(prefix) {
                        Some(local) => Some(local.to_string()),
                        None => return,
                    },
                };
                trace!(key = ?key, "Cross-tab storage event");
                let _ = changes.send(StorageChange {
                    key,
                    new_value: event.new_value(),
                    origin: None,
                });
            })
        };

        window
            .add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref())
            .map_err(|err| storage_error("listen", err))?;

        debug!(namespace, "LocalStorageStore opened");
        Ok(Self {
            window,
            storage,
            prefix,
            changes,
            listener,
        })
    }

    fn scoped(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }

    fn owned_keys(&self) -> BridgeResult<Vec<String>> {
        let Some(prefix) = &self.prefix else {
            return Ok(Vec::new());
        };
        let len = self
            .storage
            .length()
            .map_err(|err| storage_error("length", err))?;

        let mut keys = Vec::new();
        for index in 0..len {
            if let Some(key) = self
                .storage
                .key(index)
                .map_err(|err| storage_error("key", err))?
            {
                if key.starts_with(prefix.as_str()) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }
}

impl Drop for LocalStorageStore {
    fn drop(&mut self) {
        if let Err(err) = self.window.remove_event_listener_with_callback(
            "storage",
            self.listener.as_ref().unchecked_ref(),
        ) {
            warn!(error = %js_error_message(&err), "Failed to detach storage listener");
        }
    }
}

#[async_trait(?Send)]
impl KeyValueStore for LocalStorageStore {
    async fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.scoped(key))
            .map_err(|err| storage_error("getItem", err))
    }

    async fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        // Quota errors surface here as a thrown DOMException.
        self.storage
            .set_item(&self.scoped(key), value)
            .map_err(|err| storage_error("setItem", err))
    }

    async fn remove_item(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.scoped(key))
            .map_err(|err| storage_error("removeItem", err))
    }

    async fn clear(&self) -> BridgeResult<()> {
        if self.prefix.is_none() {
            return self
                .storage
                .clear()
                .map_err(|err| storage_error("clear", err));
        }
        for key in self.owned_keys()? {
            self.storage
                .remove_item(&key)
                .map_err(|err| storage_error("removeItem", err))?;
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<StorageSubscription> {
        Some(StorageSubscription::new(self.changes.subscribe(), None))
    }

    fn backend_name(&self) -> &'static str {
        "localStorage"
    }
}
