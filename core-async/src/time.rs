//! Time-related helpers.
//!
//! - Native: `tokio::time::sleep`
//! - WASM: `setTimeout` through `gloo-timers`
//!
//! Wall-clock reads go through [`now_millis`], which uses `Date.now()` in the
//! browser because `SystemTime::now` panics on `wasm32-unknown-unknown`.

pub use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::{sleep, timeout};

/// Sleeps for the specified duration on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

/// Returns the current wall-clock time as milliseconds since the Unix epoch.
///
/// A clock set before 1970 yields `0` rather than panicking.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Returns the current wall-clock time as milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}
