//! # Host Bridge Traits
//!
//! Contracts between the EcoLife core and whatever host it runs in.
//!
//! ## Overview
//!
//! The core never touches globals directly. Everything it needs from the
//! outside world is expressed as a trait here and implemented by a platform
//! crate:
//!
//! | Trait | Purpose | Implementations |
//! |-------|---------|-----------------|
//! | [`NativeBridge`](native::NativeBridge) | synchronous device primitives exposed by the Android shell | `bridge-wasm::JsNativeBridge`, `bridge-desktop::RecordingBridge` |
//! | [`BridgeProvider`](provider::BridgeProvider) | one injection point where a bridge may appear | `bridge-wasm` window providers, `bridge-desktop::SlotProvider` |
//! | [`KeyValueStore`](storage::KeyValueStore) | string persistence with optional change feed | `localStorage`, SQLite, in-memory, native bridge storage |
//! | [`Clock`](time::Clock) | wall clock for expiry checks | [`SystemClock`] |
//! | [`LoggerSink`](time::LoggerSink) | forward logs to a host pipeline | [`StdoutLoggerSink`], bridge log sink |
//!
//! ## Error Handling
//!
//! Every adapter reports failures through [`BridgeError`]. The variants encode
//! the failure taxonomy the façade exposes to callers: bridge unavailable,
//! native call failure, storage failure and decode failure. A missing key is
//! `Ok(None)`, not an error.
//!
//! ## Thread Safety
//!
//! Trait bounds use [`PlatformSendSync`](platform::PlatformSendSync): `Send +
//! Sync` on native targets, nothing on `wasm32` where handles wrap `JsValue`s.

pub mod error;
pub mod native;
pub mod platform;
pub mod provider;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use native::{is_valid_page_id, NativeBridge, NavigationPageId};
pub use provider::{probe_in_order, BridgeProvider};
pub use storage::{KeyValueStore, StorageChange, StorageSubscription, StoreOrigin};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, StdoutLoggerSink, SystemClock};
