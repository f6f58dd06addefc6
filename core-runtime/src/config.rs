//! # Core Configuration Module
//!
//! Builder-based configuration for the EcoLife core.
//!
//! ## Overview
//!
//! `CoreConfig` carries every injected collaborator the core needs: the
//! ordered list of native bridge providers, the fallback key-value store, the
//! clock, and the tunables for availability polling and session persistence.
//! The builder validates eagerly so a misconfigured host fails at startup
//! instead of at the first capability call.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` (fallback store) - used whenever native storage is not
//!   selected. With the `desktop-shims` feature a SQLite store is created from
//!   [`CoreConfigBuilder::storage_path`] when none is injected.
//!
//! ## Optional Dependencies
//!
//! - `BridgeProvider` list - empty means browser-only operation
//! - `Clock` - defaults to [`SystemClock`]
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, StoragePreference};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .provider(Arc::new(MyProvider))
//!     .fallback_store(Arc::new(MyStore))
//!     .storage_preference(StoragePreference::PreferNative)
//!     .poll_interval(Duration::from_millis(500))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No fallback store and no storage path: fails with an actionable message
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing fallback store");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{BridgeProvider, Clock, KeyValueStore, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default availability poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Which backend persisted values go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoragePreference {
    /// Native bridge storage when a bridge is attached at startup, otherwise
    /// the fallback store.
    #[default]
    PreferNative,
    /// Always the fallback store.
    FallbackOnly,
}

/// Storage layout of the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub token_key: String,
    pub user_key: String,
    /// Persist token expiry alongside the access token and honour it on read.
    pub track_expiry: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            user_key: "user".to_string(),
            track_expiry: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.token_key.trim().is_empty() {
            return Err(Error::Config("Session token key cannot be empty".to_string()));
        }
        if self.user_key.trim().is_empty() {
            return Err(Error::Config("Session user key cannot be empty".to_string()));
        }
        if self.token_key == self.user_key {
            return Err(Error::Config(format!(
                "Session token and user keys must differ (both are '{}')",
                self.token_key
            )));
        }
        Ok(())
    }
}

/// Core configuration. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Native bridge lookup strategies, tried in order.
    pub providers: Vec<Arc<dyn BridgeProvider>>,

    /// Store used when native storage is not selected (required)
    pub fallback_store: Arc<dyn KeyValueStore>,

    pub storage_preference: StoragePreference,

    /// Period of the availability re-check
    pub poll_interval: Duration,

    pub session: SessionConfig,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("CoreConfig")
            .field("providers", &providers)
            .field("fallback_store", &self.fallback_store.backend_name())
            .field("storage_preference", &self.storage_preference)
            .field("poll_interval", &self.poll_interval)
            .field("session", &self.session)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks:
    /// - poll interval is non-zero
    /// - session keys are non-empty and distinct
    /// - event buffer is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config(
                "Poll interval must be greater than zero".to_string(),
            ));
        }

        self.session.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn fallback_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "A fallback KeyValueStore is required for persisted values and the session. \
                 Desktop: enable the 'desktop-shims' feature and set .storage_path() to use the default SqliteKeyValueStore. \
                 Web: inject bridge_wasm::LocalStorageStore. \
                 Tests: inject bridge_desktop::MemoryKeyValueStore."
            .to_string(),
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_store(storage_path: Option<PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::SqliteKeyValueStore;
    use std::thread;
    use core_async::runtime::Handle;

    let path = storage_path.ok_or_else(|| {
        Error::Config(
            "No fallback store injected. Use .storage_path() for the default SQLite store \
             or .fallback_store() to inject one."
                .to_string(),
        )
    })?;

    let init_store = |path: PathBuf| -> Result<SqliteKeyValueStore> {
        core_async::runtime::block_on(SqliteKeyValueStore::new(path))
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create runtime for default KeyValueStore: {}",
                    e
                ))
            })?
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default KeyValueStore: {}", e))
            })
    };

    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                Error::Internal(
                    "Worker thread panicked while creating default KeyValueStore".to_string(),
                )
            })??,
        Err(_) => init_store(path)?,
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_store(_storage_path: Option<PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    Err(fallback_store_missing_error())
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    providers: Vec<Arc<dyn BridgeProvider>>,
    fallback_store: Option<Arc<dyn KeyValueStore>>,
    storage_preference: StoragePreference,
    poll_interval: Option<Duration>,
    session: Option<SessionConfig>,
    event_buffer_size: Option<usize>,
    storage_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
}

impl CoreConfigBuilder {
    /// Appends a provider to the lookup order.
    pub fn provider(mut self, provider: Arc<dyn BridgeProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Replaces the whole lookup order.
    pub fn providers(mut self, providers: Vec<Arc<dyn BridgeProvider>>) -> Self {
        self.providers = providers;
        self
    }

    pub fn fallback_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.fallback_store = Some(store);
        self
    }

    pub fn storage_preference(mut self, preference: StoragePreference) -> Self {
        self.storage_preference = preference;
        self
    }

    /// How often the capability hook re-checks bridge availability.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    /// use std::time::Duration;
    ///
    /// let builder = CoreConfig::builder().poll_interval(Duration::from_millis(250));
    /// ```
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = Some(session);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// SQLite file for the default store (`desktop-shims` only).
    pub fn storage_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// Fails when no fallback store is available or a value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let fallback_store = match self.fallback_store {
            Some(store) => store,
            None => provide_default_store(self.storage_path)?,
        };

        let config = CoreConfig {
            providers: self.providers,
            fallback_store,
            storage_preference: self.storage_preference,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            session: self.session.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::NativeBridge;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        items: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl KeyValueStore for MockStore {
        async fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.items.lock().unwrap().get(key).cloned())
        }

        async fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.items
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove_item(&self, key: &str) -> BridgeResult<()> {
            self.items.lock().unwrap().remove(key);
            Ok(())
        }

        async fn clear(&self) -> BridgeResult<()> {
            self.items.lock().unwrap().clear();
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "mock"
        }
    }

    struct EmptyProvider;

    impl BridgeProvider for EmptyProvider {
        fn name(&self) -> &str {
            "empty"
        }

        fn probe(&self) -> Option<Arc<dyn NativeBridge>> {
            None
        }
    }

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MockStore::default())
    }

    #[test]
    fn test_build_with_defaults() {
        let config = CoreConfig::builder()
            .fallback_store(store())
            .build()
            .expect("config should build");

        assert!(config.providers.is_empty());
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.storage_preference, StoragePreference::PreferNative);
        assert_eq!(config.session.token_key, "token");
        assert_eq!(config.session.user_key, "user");
        assert!(config.session.track_expiry);
    }

    #[test]
    fn test_providers_keep_order() {
        let config = CoreConfig::builder()
            .provider(Arc::new(EmptyProvider))
            .provider(Arc::new(EmptyProvider))
            .fallback_store(store())
            .build()
            .expect("config should build");

        assert_eq!(config.providers.len(), 2);
        let debug = format!("{:?}", config);
        assert!(debug.contains("\"empty\""));
        assert!(debug.contains("mock"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = CoreConfig::builder()
            .fallback_store(store())
            .poll_interval(Duration::ZERO)
            .build();

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Poll interval")));
    }

    #[test]
    fn test_session_keys_must_differ() {
        let result = CoreConfig::builder()
            .fallback_store(store())
            .session(SessionConfig {
                token_key: "auth".into(),
                user_key: "auth".into(),
                track_expiry: false,
            })
            .build();

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("must differ")));
    }

    #[test]
    fn test_empty_session_key_rejected() {
        let session = SessionConfig {
            token_key: " ".into(),
            ..SessionConfig::default()
        };
        assert!(session.validate().is_err());
    }

    #[test]
    fn test_zero_event_buffer_rejected() {
        let result = CoreConfig::builder()
            .fallback_store(store())
            .event_buffer_size(0)
            .build();

        assert!(result.is_err());
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_store_is_capability_error() {
        let result = CoreConfig::builder().build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "KeyValueStore");
                assert!(message.contains("desktop-shims"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_missing_store_without_path_is_config_error() {
        let result = CoreConfig::builder().build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("storage_path")));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_default_store() {
        let base = std::env::temp_dir().join(format!(
            "core-runtime-config-{}-{}",
            std::process::id(),
            SystemClock.unix_timestamp_millis()
        ));
        std::fs::create_dir_all(&base).unwrap();

        let config = CoreConfig::builder()
            .storage_path(base.join("kv.db"))
            .build()
            .expect("desktop default store should succeed");

        assert_eq!(config.fallback_store.backend_name(), "sqlite");

        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async {
            config.fallback_store.set_item("theme", "dark").await.unwrap();
            let value = config.fallback_store.get_item("theme").await.unwrap();
            assert_eq!(value.as_deref(), Some("dark"));
        });

        drop(config);
        let _ = std::fs::remove_dir_all(&base);
    }
}
