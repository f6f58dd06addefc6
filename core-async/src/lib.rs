//! Runtime-agnostic async primitives for the EcoLife core.
//!
//! The bridge façade, the availability poller and the cross-tab storage sync
//! all need to sleep, spawn background work and cancel it again when the owning
//! view goes away. This crate gives them one API for both targets:
//!
//! - Native platforms (desktop, tests): Tokio
//! - WebAssembly: the browser event loop through `wasm-bindgen-futures` and
//!   `gloo-timers`
//!
//! # Modules
//!
//! - `task`: detached task spawning
//! - `time`: sleeping and wall-clock helpers
//! - `sync`: async locks, channels and [`CancellationToken`](sync::CancellationToken)
//! - `runtime`: blocking entry point (native only)
//!
//! # Examples
//!
//! ```rust,no_run
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep, Duration};
//!
//! # fn example() {
//! let token = CancellationToken::new();
//! let child = token.clone();
//!
//! core_async::task::spawn_detached(async move {
//!     while !child.is_cancelled() {
//!         sleep(Duration::from_millis(250)).await;
//!     }
//! });
//!
//! token.cancel();
//! # }
//! ```

#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use task::spawn_detached;
pub use time::{sleep, Duration};
