//! Trait-bound helpers that follow the threading model of each target.
//!
//! Native targets share bridge objects across Tokio tasks and need
//! `Send + Sync`. The browser build runs on one thread and wraps `JsValue`
//! handles, which can never satisfy those bounds, so there the markers are
//! empty.

/// `Send + Sync` on native targets, no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// `Send` on native targets, no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSend for T where T: Send {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSend {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSend for T {}
