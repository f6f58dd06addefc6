//! Workspace placeholder crate.
//!
//! Exposes the `desktop-shims` and `wasm` feature flags so a host shell can
//! depend on `ecolife-workspace` and get a fully wired `core-service` without
//! naming each bridge crate individually.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;
