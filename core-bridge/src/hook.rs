//! # Capability Hook
//!
//! View-facing wrapper around [`AndroidApi`]:
//!
//! - an `available` flag refreshed on a fixed interval, because the shell may
//!   inject its bridge after the page has loaded
//! - a shared `loading` flag raised for the duration of every capability call
//! - a fire-and-forget [`log`](CapabilityHook::log)
//!
//! The poll task belongs to the hook. Dropping the hook (or calling
//! [`teardown`](CapabilityHook::teardown)) cancels it, so no timer outlives
//! the view that mounted it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::NavigationPageId;
use core_async::sync::{watch, CancelOnDrop, CancellationToken};
use core_runtime::events::{BridgeEvent, CoreEvent, EventBus};
use futures::future::{self, Either};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::facade::AndroidApi;
use crate::types::{
    BrightnessConfig, CapabilityResult, ClipboardData, ShareData, StorageResult, SystemInfo,
    ToastOptions, VibrationOptions,
};

/// Clears the loading flag when the wrapped call finishes, including on
/// early return.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct CapabilityHook {
    api: Arc<AndroidApi>,
    available: watch::Receiver<bool>,
    loading: AtomicBool,
    poller: CancelOnDrop,
}

impl CapabilityHook {
    /// Reads availability once, then starts the poll task.
    ///
    /// Must be called inside a Tokio runtime on native targets.
    pub fn mount(
        api: Arc<AndroidApi>,
        poll_interval: Duration,
        event_bus: Option<EventBus>,
    ) -> Self {
        let initial = api.probe();
        let (tx, rx) = watch::channel(initial);
        let poller = CancelOnDrop::new(CancellationToken::new());

        core_async::spawn_detached(poll_availability(
            Arc::clone(&api),
            tx,
            poll_interval,
            poller.token(),
            event_bus,
        ));

        debug!(
            available = initial,
            interval_ms = poll_interval.as_millis() as u64,
            "Capability hook mounted"
        );

        Self {
            api,
            available: rx,
            loading: AtomicBool::new(false),
            poller,
        }
    }

    pub fn is_available(&self) -> bool {
        *self.available.borrow()
    }

    /// Receiver that changes whenever availability flips.
    pub fn watch_available(&self) -> watch::Receiver<bool> {
        self.available.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn api(&self) -> &Arc<AndroidApi> {
        &self.api
    }

    fn busy(&self) -> BusyGuard<'_> {
        BusyGuard::raise(&self.loading)
    }

    pub async fn vibrate(&self, options: VibrationOptions) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.vibrate(options).await
    }

    pub async fn show_toast(&self, options: ToastOptions) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.show_toast(options).await
    }

    pub async fn show_notification(&self, title: &str, message: &str) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.show_notification(title, message).await
    }

    pub async fn copy_to_clipboard(&self, text: &str) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.copy_to_clipboard(text).await
    }

    pub async fn get_from_clipboard(&self) -> Option<ClipboardData> {
        let _busy = self.busy();
        self.api.get_from_clipboard().await
    }

    pub async fn share(&self, data: ShareData) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.share(data).await
    }

    pub async fn get_system_info(&self) -> Option<SystemInfo> {
        let _busy = self.busy();
        self.api.get_system_info().await
    }

    pub async fn set_brightness(&self, config: BrightnessConfig) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.set_brightness(config).await
    }

    pub async fn save_to_storage<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let _busy = self.busy();
        self.api.save_to_storage(key, value).await
    }

    pub async fn get_from_storage<T>(&self, key: &str, default: T) -> StorageResult<T>
    where
        T: DeserializeOwned,
    {
        let _busy = self.busy();
        self.api.get_from_storage(key, default).await
    }

    pub async fn remove_from_storage(&self, key: &str) -> StorageResult<()> {
        let _busy = self.busy();
        self.api.remove_from_storage(key).await
    }

    pub async fn clear_storage(&self) -> StorageResult<()> {
        let _busy = self.busy();
        self.api.clear_storage().await
    }

    pub async fn update_bottom_navigation(&self, page: NavigationPageId) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.update_bottom_navigation(page).await
    }

    pub async fn hide_bottom_navigation(&self) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.hide_bottom_navigation().await
    }

    pub async fn show_bottom_navigation(&self) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.show_bottom_navigation().await
    }

    pub async fn reset_fab(&self) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.reset_fab().await
    }

    pub async fn finish_app(&self) {
        let _busy = self.busy();
        self.api.finish_app().await
    }

    pub async fn restart_app(&self) -> CapabilityResult<()> {
        let _busy = self.busy();
        self.api.restart_app().await
    }

    /// Does not touch the loading flag.
    pub fn log(&self, message: &str) {
        self.api.log(message);
    }

    /// Stops the poll task. Dropping the hook has the same effect.
    pub fn teardown(self) {
        self.poller.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.poller.is_cancelled()
    }
}

async fn poll_availability(
    api: Arc<AndroidApi>,
    available: watch::Sender<bool>,
    interval: Duration,
    token: CancellationToken,
    event_bus: Option<EventBus>,
) {
    loop {
        let tick = core_async::sleep(interval);
        let cancelled = token.cancelled();
        futures::pin_mut!(tick, cancelled);
        if let Either::Left(_) = future::select(cancelled, tick).await {
            break;
        }

        let now_available = api.probe();
        let changed = available.send_if_modified(|current| {
            if *current == now_available {
                false
            } else {
                *current = now_available;
                true
            }
        });

        if changed {
            info!(available = now_available, "Native bridge availability changed");
            if let Some(bus) = &event_bus {
                let _ = bus.emit(CoreEvent::Bridge(BridgeEvent::AvailabilityChanged {
                    available: now_available,
                    provider: api.provider_name(),
                }));
            }
        }
    }
    debug!("Availability poll stopped");
}
