use std::fmt;
use std::sync::Arc;

use bridge_traits::platform::PlatformSendSync;
use bridge_traits::{KeyValueStore, StorageChange, StorageSubscription};
use core_async::sync::{watch, CancelOnDrop, CancellationToken};
use core_runtime::events::{ChangeSource, CoreEvent, EventBus, StorageEvent};
use futures::future::{self, Either};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// What a view renders for one persisted key.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSnapshot<T> {
    pub value: T,
    pub loading: bool,
    /// Last I/O failure. Absent keys and undecodable values never set this.
    pub error: Option<String>,
}

/// Bounds every persisted type satisfies.
pub trait Persistable:
    Serialize + DeserializeOwned + Clone + PlatformSendSync + fmt::Debug + 'static
{
}

impl<T> Persistable for T where
    T: Serialize + DeserializeOwned + Clone + PlatformSendSync + fmt::Debug + 'static
{
}

/// Outcome of reading one key, before it is folded into the snapshot.
enum Loaded<T> {
    Value(T),
    Absent,
    Undecodable(String),
}

fn decode_raw<T: Persistable>(raw: Option<String>) -> Loaded<T> {
    match raw.filter(|raw| !raw.is_empty()) {
        None => Loaded::Absent,
        Some(raw) => match decode_json::<T>(&raw) {
            Ok(value) => Loaded::Value(value),
            Err(err) => Loaded::Undecodable(err.to_string()),
        },
    }
}

/// Parses a stored JSON document. Text that is not JSON at all is accepted
/// as a bare string so entries written without encoding still load.
fn decode_json<T: Persistable>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str::<T>(raw).or_else(|json_err| {
        if serde_json::from_str::<Value>(raw).is_ok() {
            return Err(json_err);
        }
        serde_json::from_value(Value::String(raw.to_owned())).map_err(|_| json_err)
    })
}

/// One key in the store, loaded on mount and kept in memory.
///
/// In-memory state only changes after the backend accepted a write. Dropping
/// the value (or calling [`detach`](Self::detach)) stops cross-tab sync.
pub struct PersistentValue<T: Persistable> {
    key: String,
    default: T,
    store: Arc<dyn KeyValueStore>,
    state: Arc<watch::Sender<ValueSnapshot<T>>>,
    event_bus: Option<EventBus>,
    sync: Option<CancelOnDrop>,
}

impl<T: Persistable> PersistentValue<T> {
    /// Loads `key` and, if the store has a change feed, starts following it.
    ///
    /// Must be called inside a Tokio runtime on native targets when the store
    /// publishes changes.
    pub async fn mount(
        key: impl Into<String>,
        default: T,
        store: Arc<dyn KeyValueStore>,
        event_bus: Option<EventBus>,
    ) -> Self {
        let (state, _) = watch::channel(ValueSnapshot {
            value: default.clone(),
            loading: true,
            error: None,
        });

        let mut persistent = Self {
            key: key.into(),
            default,
            store,
            state: Arc::new(state),
            event_bus,
            sync: None,
        };

        persistent.reload().await;

        if let Some(subscription) = persistent.store.subscribe() {
            let guard = CancelOnDrop::new(CancellationToken::new());
            core_async::spawn_detached(follow_remote_changes(
                persistent.key.clone(),
                persistent.default.clone(),
                subscription,
                Arc::clone(&persistent.state),
                persistent.event_bus.clone(),
                guard.token(),
            ));
            persistent.sync = Some(guard);
        }

        persistent
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> T {
        self.state.borrow().value.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn snapshot(&self) -> ValueSnapshot<T> {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change, local or remote.
    pub fn subscribe(&self) -> watch::Receiver<ValueSnapshot<T>> {
        self.state.subscribe()
    }

    /// Re-reads the key from the store.
    ///
    /// Absent or undecodable values fall back to the default without an
    /// error; a failed read keeps the default and records the error.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn reload(&self) {
        self.state.send_modify(|s| s.loading = true);

        let (value, error) = match self.store.get_item(&self.key).await {
            Ok(raw) => match decode_raw::<T>(raw) {
                Loaded::Value(value) => (value, None),
                Loaded::Absent => (self.default.clone(), None),
                Loaded::Undecodable(reason) => {
                    warn!(reason = %reason, "Stored value undecodable, using default");
                    (self.default.clone(), None)
                }
            },
            Err(err) => {
                warn!(error = %err, "Failed to load persisted value");
                (self.default.clone(), Some(err.to_string()))
            }
        };

        self.state.send_replace(ValueSnapshot {
            value,
            loading: false,
            error,
        });
    }

    /// Persists `value` as JSON; memory is updated only if the write
    /// succeeded.
    #[instrument(skip(self, value), fields(key = %self.key))]
    pub async fn save(&self, value: T) -> bool {
        let written = match serde_json::to_string(&value) {
            Ok(encoded) => self
                .store
                .set_item(&self.key, &encoded)
                .await
                .map_err(|err| err.to_string()),
            Err(err) => Err(format!("Failed to encode value: {err}")),
        };

        match written {
            Ok(()) => {
                self.state.send_modify(|s| {
                    s.value = value;
                    s.error = None;
                });
                self.emit(StorageEvent::Saved {
                    key: self.key.clone(),
                    source: ChangeSource::Local,
                });
                true
            }
            Err(message) => self.fail(message),
        }
    }

    /// Deletes the persisted entry and resets memory to the default.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn remove(&self) -> bool {
        match self.store.remove_item(&self.key).await {
            Ok(()) => {
                let default = self.default.clone();
                self.state.send_modify(|s| {
                    s.value = default;
                    s.error = None;
                });
                self.emit(StorageEvent::Removed {
                    key: self.key.clone(),
                    source: ChangeSource::Local,
                });
                true
            }
            Err(err) => self.fail(err.to_string()),
        }
    }

    /// Applies `f` to the in-memory value and saves the result. Not atomic:
    /// concurrent updaters race and the last save wins.
    pub async fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.state.borrow().value);
        self.save(next).await
    }

    /// Stops following other writers. Local operations keep working.
    pub fn detach(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.cancel();
            debug!(key = %self.key, "Persistent value detached");
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.as_ref().is_some_and(|sync| !sync.is_cancelled())
    }

    fn fail(&self, message: String) -> bool {
        warn!(key = %self.key, error = %message, "Persisted value operation failed");
        self.state.send_modify(|s| s.error = Some(message.clone()));
        self.emit(StorageEvent::Failed {
            key: self.key.clone(),
            message,
        });
        false
    }

    fn emit(&self, event: StorageEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Storage(event));
        }
    }
}

impl<T: Persistable> fmt::Debug for PersistentValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentValue")
            .field("key", &self.key)
            .field("backend", &self.store.backend_name())
            .field("snapshot", &*self.state.borrow())
            .field("syncing", &self.is_syncing())
            .finish()
    }
}

async fn follow_remote_changes<T: Persistable>(
    key: String,
    default: T,
    mut subscription: StorageSubscription,
    state: Arc<watch::Sender<ValueSnapshot<T>>>,
    event_bus: Option<EventBus>,
    token: CancellationToken,
) {
    loop {
        let next = subscription.next();
        let cancelled = token.cancelled();
        futures::pin_mut!(next, cancelled);

        let change: StorageChange = match future::select(cancelled, next).await {
            Either::Left(_) => break,
            Either::Right((Some(change), _)) => change,
            Either::Right((None, _)) => break,
        };

        if !change.affects(&key) {
            continue;
        }

        let removed = change.new_value.is_none();
        let value = match decode_raw::<T>(change.new_value) {
            Loaded::Value(value) => value,
            Loaded::Absent => default.clone(),
            Loaded::Undecodable(reason) => {
                warn!(key = %key, reason = %reason, "Remote value undecodable, using default");
                default.clone()
            }
        };

        debug!(key = %key, removed, "Applying change from another writer");
        state.send_modify(|s| {
            s.value = value;
            s.error = None;
        });

        if let Some(bus) = &event_bus {
            let event = if removed {
                StorageEvent::Removed {
                    key: key.clone(),
                    source: ChangeSource::Remote,
                }
            } else {
                StorageEvent::Saved {
                    key: key.clone(),
                    source: ChangeSource::Remote,
                }
            };
            let _ = bus.emit(CoreEvent::Storage(event));
        }
    }
    debug!(key = %key, "Remote change sync stopped");
}
