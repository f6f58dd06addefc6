//! Lookup strategies for locating the native bridge.
//!
//! The shell may inject the same capability object at more than one place.
//! Each place is described by a [`BridgeProvider`]; the façade tries its
//! providers in order and keeps the first handle found.

use std::sync::Arc;

use crate::native::NativeBridge;
use crate::platform::PlatformSendSync;

/// A single way of finding a [`NativeBridge`] handle.
///
/// `probe` must be cheap and side-effect free: it is called before every
/// capability invocation until a handle is found, and on every availability
/// poll tick.
pub trait BridgeProvider: PlatformSendSync {
    /// Short human-readable name used in logs (e.g. `window.Android`).
    fn name(&self) -> &str;

    /// Returns the handle if this injection point is currently populated.
    fn probe(&self) -> Option<Arc<dyn NativeBridge>>;
}

/// Tries `providers` in order and returns the first hit with its provider name.
pub fn probe_in_order(
    providers: &[Arc<dyn BridgeProvider>],
) -> Option<(String, Arc<dyn NativeBridge>)> {
    providers
        .iter()
        .find_map(|provider| provider.probe().map(|handle| (provider.name().to_string(), handle)))
}
