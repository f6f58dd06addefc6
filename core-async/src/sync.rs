//! Synchronization primitives.
//!
//! Tokio's `sync` module has no runtime dependency, so the same channel and
//! lock types are re-exported on both targets. Only the cancellation token
//! differs: `tokio-util` natively, a single-threaded implementation on wasm.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, CancellationToken};
//!
//! let (tx, rx) = watch::channel(false);
//! tx.send_replace(true);
//! assert!(*rx.borrow());
//!
//! let token = CancellationToken::new();
//! token.cancel();
//! assert!(token.is_cancelled());
//! ```

pub use tokio::sync::{
    broadcast, watch, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

#[cfg(not(target_arch = "wasm32"))]
pub use tokio_util::sync::CancellationToken;

#[cfg(target_arch = "wasm32")]
pub use crate::wasm::cancellation_token::CancellationToken;

/// Drop guard that cancels the wrapped token when it goes out of scope.
///
/// Owners of background tasks keep one of these so that tearing down the owner
/// deterministically stops the task.
#[derive(Debug)]
pub struct CancelOnDrop {
    token: CancellationToken,
}

impl CancelOnDrop {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Returns a clone of the guarded token for handing to a task.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
