//! Task spawning.
//!
//! Only detached ("fire and forget") tasks are exposed. Callers that need to
//! stop a task hand it a [`CancellationToken`](crate::sync::CancellationToken)
//! instead of holding a join handle, which keeps the API identical on both
//! targets.
//!
//! - Native: `tokio::spawn`, so the future must be `Send`
//! - WASM: `wasm_bindgen_futures::spawn_local` on the single browser thread

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::yield_now;

/// Spawns a background task that runs until completion or until it observes
/// its own cancellation signal.
///
/// Must be called from within a Tokio runtime on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// Spawns a background task on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Yields once to the browser event loop.
#[cfg(target_arch = "wasm32")]
pub async fn yield_now() {
    gloo_timers::future::sleep(std::time::Duration::from_millis(0)).await;
}
