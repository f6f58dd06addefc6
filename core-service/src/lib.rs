//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (native bridge
//! providers, fallback storage, clock) into the shared Rust core and hands
//! out the pieces a view needs: the capability hook, persisted values, the
//! session and the REST authorization helper. Desktop builds typically enable
//! the `desktop-shims` feature (SQLite fallback storage through
//! `bridge-desktop`), whereas WebAssembly builds enable the `wasm` feature and
//! rely on the adapters from `bridge-wasm`.

pub mod api;
pub mod error;

pub use api::{ApiAuthorizer, ResponseDisposition};
pub use error::{CoreError, Result};

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{KeyValueStore, LoggerSink};
use core_auth::{AuthState, SessionManager};
use core_bridge::{select_backend, AndroidApi, BridgeLogSink, CapabilityHook};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver};
use core_storage::{Persistable, PersistentValue};
use tracing::{info, warn};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::build_wasm_bridges;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    event_bus: EventBus,
    api: Arc<AndroidApi>,
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionManager>,
    poll_interval: Duration,
}

impl CoreService {
    /// Builds every component from `config` and restores the persisted
    /// session.
    ///
    /// The storage backend is chosen once, here. A session that cannot be
    /// read leaves the service usable in the anonymous state.
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let api = Arc::new(
            AndroidApi::new(config.providers.clone(), Arc::clone(&config.clock))
                .with_event_bus(event_bus.clone()),
        );
        let store = select_backend(
            &api,
            Arc::clone(&config.fallback_store),
            config.storage_preference,
        );
        let session = Arc::new(SessionManager::new(
            Arc::clone(&store),
            config.session.clone(),
            event_bus.clone(),
            Arc::clone(&config.clock),
        ));

        if let Err(e) = session.init().await {
            warn!(error = %e, "Continuing without a restored session");
        }

        info!(
            bridge = api.provider_name().as_deref().unwrap_or("none"),
            backend = store.backend_name(),
            "Core service ready"
        );

        Ok(Self {
            event_bus,
            api,
            store,
            session,
            poll_interval: config.poll_interval,
        })
    }

    pub fn api(&self) -> Arc<AndroidApi> {
        Arc::clone(&self.api)
    }

    /// Mounts a capability hook for one view. Tear it down when the view
    /// goes away.
    pub fn capability_hook(&self) -> CapabilityHook {
        CapabilityHook::mount(
            Arc::clone(&self.api),
            self.poll_interval,
            Some(self.event_bus.clone()),
        )
    }

    /// Loads `key` from the selected store, following cross-tab changes when
    /// the store reports them.
    pub async fn persistent_value<T: Persistable>(
        &self,
        key: impl Into<String>,
        default: T,
    ) -> PersistentValue<T> {
        PersistentValue::mount(
            key,
            default,
            Arc::clone(&self.store),
            Some(self.event_bus.clone()),
        )
        .await
    }

    pub fn session(&self) -> Arc<SessionManager> {
        Arc::clone(&self.session)
    }

    pub async fn auth_state(&self) -> AuthState {
        self.session.state().await
    }

    pub fn authorizer(&self) -> ApiAuthorizer {
        ApiAuthorizer::new(Arc::clone(&self.session))
    }

    /// Sink for `LoggingConfig::with_logger_sink` that writes to the native
    /// log when a bridge is attached.
    pub fn bridge_log_sink(&self) -> Arc<dyn LoggerSink> {
        Arc::new(BridgeLogSink::new(Arc::clone(&self.api)))
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe_events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```
/// # #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
///
/// let core = bootstrap_wasm(WasmBridgeConfig::default()).await?;
/// let hook = core.capability_hook();
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(config: WasmBridgeConfig) -> Result<CoreService> {
    let bridges = build_wasm_bridges(config)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let config = CoreConfig::builder()
        .providers(bridges.providers)
        .fallback_store(bridges.fallback_store)
        .build()?;
    CoreService::bootstrap(config).await
}
