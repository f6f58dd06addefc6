//! # Native Bridge Façade
//!
//! Uniform asynchronous API over the Android shell's injected capability
//! object, degrading to structured failures when no shell is present.
//!
//! ## Components
//!
//! - [`AndroidApi`]: handle discovery over an ordered provider list, every
//!   native capability as an async call returning a value instead of raising
//! - [`CapabilityHook`]: availability polling and a busy flag for the view
//!   layer, cancelled deterministically on teardown
//! - [`NativeKeyValueStore`]: the shell's storage primitives as a
//!   [`KeyValueStore`](bridge_traits::KeyValueStore), and [`select_backend`]
//!   to choose between it and the browser fallback
//! - [`BridgeLogSink`]: a `LoggerSink` that forwards diagnostics to Logcat
//! - [`codec`]: JSON encoding rules shared by every persisted value
//!
//! ## Usage
//!
//! ```ignore
//! use core_bridge::{AndroidApi, CapabilityHook, ToastOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let api = Arc::new(AndroidApi::new(providers, clock));
//! let hook = CapabilityHook::mount(api.clone(), Duration::from_secs(1), None);
//!
//! if hook.show_toast(ToastOptions::short("Mission complete")).await.is_err() {
//!     // No shell: show an in-page banner instead.
//! }
//! ```

pub mod codec;
pub mod facade;
pub mod hook;
pub mod log_sink;
pub mod storage;
pub mod types;

pub use facade::AndroidApi;
pub use hook::CapabilityHook;
pub use log_sink::BridgeLogSink;
pub use storage::{select_backend, NativeKeyValueStore};
pub use types::{
    clamp_brightness, format_vibration_pattern, safe_json_parse, BrightnessConfig,
    CapabilityResult, ClipboardData, ShareData, StorageResult, SystemInfo, ToastDuration,
    ToastOptions, VibrationOptions, DEFAULT_SHARE_TITLE, DEFAULT_VIBRATION_MS,
};
