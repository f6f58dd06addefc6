//! # Desktop Bridge Implementations
//!
//! Native-target implementations of the bridge traits, used by desktop hosts,
//! integration tests and the `desktop-shims` feature.
//!
//! ## Overview
//!
//! - `KeyValueStore` backed by SQLite ([`SqliteKeyValueStore`])
//! - `KeyValueStore` backed by a shared in-memory map whose peer handles
//!   behave like browser tabs on one origin ([`MemoryKeyValueStore`])
//! - `NativeBridge` test double that records calls and plays back scripted
//!   results ([`RecordingBridge`])
//! - `BridgeProvider` whose slot can be filled after startup, simulating a
//!   late bridge injection ([`SlotProvider`])
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{MemoryKeyValueStore, RecordingBridge, SlotProvider};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(SlotProvider::new("window.Android"));
//! let store = Arc::new(MemoryKeyValueStore::new());
//!
//! // Later, once the "shell" is ready:
//! provider.install(Arc::new(RecordingBridge::new()));
//! ```

mod memory_store;
mod recording_bridge;
mod slot_provider;
mod sqlite_store;

pub use memory_store::MemoryKeyValueStore;
pub use recording_bridge::{NativeCall, RecordingBridge};
pub use slot_provider::SlotProvider;
pub use sqlite_store::SqliteKeyValueStore;
