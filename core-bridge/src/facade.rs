//! # Bridge Façade
//!
//! [`AndroidApi`] locates the native capability object through an ordered list
//! of [`BridgeProvider`]s and exposes every primitive as an async call.
//!
//! ## Handle lifecycle
//!
//! - The first provider that yields a handle wins and the handle is cached.
//! - While nothing is cached, every capability call re-probes first, so a
//!   bridge injected after startup is picked up by the next call.
//! - [`AndroidApi::reprobe`] drops the cache and probes again.
//!
//! ## Failure handling
//!
//! No capability raises. Bridge absence becomes
//! [`BridgeError::Unavailable`], a native exception becomes
//! [`BridgeError::NativeCall`], and both are logged at `warn` and published as
//! [`BridgeEvent::CapabilityFailed`] when an event bus is attached.

use std::sync::Arc;

use bridge_traits::{
    probe_in_order, BridgeError, BridgeProvider, Clock, NativeBridge, NavigationPageId,
};
use core_runtime::events::{BridgeEvent, CoreEvent, EventBus};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::codec::{decode_value, encode_value};
use crate::types::{
    clamp_brightness, format_vibration_pattern, BrightnessConfig, CapabilityResult,
    ClipboardData, ShareData, StorageResult, SystemInfo, ToastDuration, ToastOptions,
    VibrationOptions, DEFAULT_VIBRATION_MS,
};

struct ResolvedHandle {
    provider: String,
    bridge: Arc<dyn NativeBridge>,
}

/// Explicitly constructed façade over the native bridge.
pub struct AndroidApi {
    providers: Vec<Arc<dyn BridgeProvider>>,
    handle: RwLock<Option<ResolvedHandle>>,
    clock: Arc<dyn Clock>,
    event_bus: Option<EventBus>,
}

impl AndroidApi {
    /// Creates the façade and performs the initial probe.
    pub fn new(providers: Vec<Arc<dyn BridgeProvider>>, clock: Arc<dyn Clock>) -> Self {
        let api = Self {
            providers,
            handle: RwLock::new(None),
            clock,
            event_bus: None,
        };
        api.probe();
        api
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// True iff a handle is cached. No probing, no side effects.
    pub fn is_available(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Name of the provider the cached handle came from.
    pub fn provider_name(&self) -> Option<String> {
        self.handle.read().as_ref().map(|h| h.provider.clone())
    }

    /// Probes only when nothing is cached. Returns availability afterwards.
    pub fn probe(&self) -> bool {
        if self.is_available() {
            return true;
        }
        self.resolve().is_some()
    }

    /// Drops the cached handle and probes from scratch.
    pub fn reprobe(&self) -> bool {
        *self.handle.write() = None;
        self.resolve().is_some()
    }

    fn resolve(&self) -> Option<Arc<dyn NativeBridge>> {
        let (provider, bridge) = probe_in_order(&self.providers)?;
        let mut slot = self.handle.write();
        // Another caller may have resolved concurrently; keep the first handle.
        if let Some(existing) = slot.as_ref() {
            return Some(Arc::clone(&existing.bridge));
        }
        info!(provider = %provider, "Native bridge found");
        *slot = Some(ResolvedHandle {
            provider,
            bridge: Arc::clone(&bridge),
        });
        Some(bridge)
    }

    /// Cached handle, probing first when none is cached.
    pub fn ensure_handle(&self) -> CapabilityResult<Arc<dyn NativeBridge>> {
        if let Some(resolved) = self.handle.read().as_ref() {
            return Ok(Arc::clone(&resolved.bridge));
        }
        self.resolve().ok_or_else(|| {
            let tried: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
            BridgeError::Unavailable(format!(
                "no native bridge injected (tried: {})",
                if tried.is_empty() {
                    "none".to_string()
                } else {
                    tried.join(", ")
                }
            ))
        })
    }

    /// Resolves the handle, runs `call`, logs and publishes any failure.
    fn invoke<T>(
        &self,
        capability: &'static str,
        call: impl FnOnce(&dyn NativeBridge) -> CapabilityResult<T>,
    ) -> CapabilityResult<T> {
        let result = self
            .ensure_handle()
            .and_then(|bridge| call(bridge.as_ref()));
        if let Err(err) = &result {
            self.report_failure(capability, err);
        }
        result
    }

    fn report_failure(&self, capability: &str, err: &BridgeError) {
        warn!(capability, error = %err, "Native capability failed");
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Bridge(BridgeEvent::CapabilityFailed {
                capability: capability.to_string(),
                message: err.to_string(),
            }));
        }
    }

    // ========================================================================
    // Device feedback
    // ========================================================================

    /// A non-empty pattern goes to the pattern primitive; otherwise a single
    /// vibration of `duration_ms` (200 ms when unset).
    pub async fn vibrate(&self, options: VibrationOptions) -> CapabilityResult<()> {
        self.invoke("vibrate", |bridge| {
            if options.pattern.is_empty() {
                bridge.vibrate(options.duration_ms.unwrap_or(DEFAULT_VIBRATION_MS))
            } else {
                bridge.vibrate_pattern(&format_vibration_pattern(&options.pattern))
            }
        })
    }

    pub async fn show_toast(&self, options: ToastOptions) -> CapabilityResult<()> {
        self.invoke("showToast", |bridge| match options.duration {
            ToastDuration::Short => bridge.show_toast(&options.message),
            ToastDuration::Long => bridge.show_long_toast(&options.message),
        })
    }

    pub async fn show_notification(&self, title: &str, message: &str) -> CapabilityResult<()> {
        self.invoke("showNotification", |bridge| {
            bridge.show_notification(title, message)
        })
    }

    // ========================================================================
    // Clipboard and sharing
    // ========================================================================

    pub async fn copy_to_clipboard(&self, text: &str) -> CapabilityResult<()> {
        self.invoke("copyToClipboard", |bridge| bridge.copy_to_clipboard(text))
    }

    /// `None` when the bridge is absent or the read raised.
    pub async fn get_from_clipboard(&self) -> Option<ClipboardData> {
        self.invoke("getFromClipboard", |bridge| bridge.get_from_clipboard())
            .ok()
            .map(|text| ClipboardData {
                text,
                timestamp: self.clock.now(),
            })
    }

    pub async fn share(&self, data: ShareData) -> CapabilityResult<()> {
        self.invoke("share", |bridge| {
            bridge.share(&data.text, data.title_or_default())
        })
    }

    // ========================================================================
    // Display and system state
    // ========================================================================

    pub async fn get_screen_brightness(&self) -> Option<i32> {
        self.invoke("getScreenBrightness", |bridge| bridge.get_screen_brightness())
            .ok()
    }

    /// Out-of-range levels are clamped into 0..=255, never rejected.
    pub async fn set_brightness(&self, config: BrightnessConfig) -> CapabilityResult<()> {
        let level = clamp_brightness(config.level);
        if i32::from(level) != config.level {
            debug!(requested = config.level, applied = level, "Brightness clamped");
        }
        self.invoke("setScreenBrightness", |bridge| {
            bridge.set_screen_brightness(level)
        })
    }

    pub async fn is_location_enabled(&self) -> bool {
        self.invoke("isLocationEnabled", |bridge| bridge.is_location_enabled())
            .unwrap_or(false)
    }

    /// Brightness and location state together; `None` if either read fails.
    pub async fn get_system_info(&self) -> Option<SystemInfo> {
        self.invoke("getSystemInfo", |bridge| {
            Ok(SystemInfo {
                brightness: bridge.get_screen_brightness()?,
                location_enabled: bridge.is_location_enabled()?,
            })
        })
        .ok()
    }

    // ========================================================================
    // Storage
    // ========================================================================

    /// Strings are stored verbatim, other values as JSON.
    #[instrument(skip(self, value))]
    pub async fn save_to_storage<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let result = encode_value(value).and_then(|encoded| {
            self.invoke("saveToStorage", |bridge| bridge.save_to_storage(key, &encoded))
        });
        match result {
            Ok(()) => StorageResult::done(),
            Err(err) => StorageResult::failed(err.to_string(), None),
        }
    }

    /// Reads and decodes `key`.
    ///
    /// Absent (or empty) values yield `success: true` with `default`. Read
    /// failures and values that decode neither as JSON nor as a plain string
    /// yield `success: false`, still carrying `default`.
    #[instrument(skip(self, default))]
    pub async fn get_from_storage<T>(&self, key: &str, default: T) -> StorageResult<T>
    where
        T: DeserializeOwned,
    {
        let raw = match self.invoke("getFromStorage", |bridge| bridge.get_from_storage(key)) {
            Ok(raw) => raw,
            Err(err) => return StorageResult::failed(err.to_string(), Some(default)),
        };

        match raw.filter(|value| !value.is_empty()) {
            None => StorageResult::ok(Some(default)),
            Some(raw) => match decode_value::<T>(&raw) {
                Ok(value) => StorageResult::ok(Some(value)),
                Err(err) => {
                    self.report_failure("getFromStorage", &err);
                    StorageResult::failed(err.to_string(), Some(default))
                }
            },
        }
    }

    pub async fn remove_from_storage(&self, key: &str) -> StorageResult<()> {
        match self.invoke("removeFromStorage", |bridge| bridge.remove_from_storage(key)) {
            Ok(()) => StorageResult::done(),
            Err(err) => StorageResult::failed(err.to_string(), None),
        }
    }

    pub async fn clear_storage(&self) -> StorageResult<()> {
        match self.invoke("clearStorage", |bridge| bridge.clear_storage()) {
            Ok(()) => StorageResult::done(),
            Err(err) => StorageResult::failed(err.to_string(), None),
        }
    }

    // ========================================================================
    // Navigation chrome
    // ========================================================================

    pub async fn update_bottom_navigation(&self, page: NavigationPageId) -> CapabilityResult<()> {
        self.invoke("updateBottomNavigation", |bridge| {
            bridge.update_bottom_navigation(page)
        })
    }

    pub async fn hide_bottom_navigation(&self) -> CapabilityResult<()> {
        self.invoke("hideBottomNavigation", |bridge| bridge.hide_bottom_navigation())
    }

    pub async fn show_bottom_navigation(&self) -> CapabilityResult<()> {
        self.invoke("showBottomNavigation", |bridge| bridge.show_bottom_navigation())
    }

    pub async fn reset_fab(&self) -> CapabilityResult<()> {
        self.invoke("resetFabFromBridge", |bridge| bridge.reset_fab())
    }

    // ========================================================================
    // App lifecycle and diagnostics
    // ========================================================================

    /// Closes the host activity. Failures are only logged.
    pub async fn finish_app(&self) {
        let _ = self.invoke("finishApp", |bridge| bridge.finish_app());
    }

    pub async fn restart_app(&self) -> CapabilityResult<()> {
        self.invoke("restartApp", |bridge| bridge.restart_app())
    }

    /// Fire-and-forget line to the host log.
    pub fn log(&self, message: &str) {
        if let Err(err) = self
            .ensure_handle()
            .and_then(|bridge| bridge.log(message))
        {
            // Kept out of report_failure so logging never feeds back into itself.
            debug!(error = %err, "Native log unavailable");
        }
    }
}

impl std::fmt::Debug for AndroidApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidApi")
            .field("providers", &self.providers.len())
            .field("provider", &self.provider_name())
            .finish()
    }
}
