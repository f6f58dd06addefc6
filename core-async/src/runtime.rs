//! Blocking entry point for native callers that sit outside an async context
//! (logging layers, synchronous config builders).

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a throwaway current-thread
/// runtime.
///
/// Returns an error instead of panicking when the runtime cannot be built.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
