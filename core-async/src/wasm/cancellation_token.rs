//! Cancellation token for the single-threaded browser runtime.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct TokenState {
    cancelled: bool,
    waiters: Vec<Waker>,
}

/// Cooperative cancellation signal shared by clones.
///
/// Mirrors the subset of `tokio_util::sync::CancellationToken` used by the
/// core: `cancel`, `is_cancelled` and `cancelled().await`.
#[derive(Clone, Default)]
pub struct CancellationToken {
    state: Rc<RefCell<TokenState>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every pending `cancelled()` future.
    pub fn cancel(&self) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.cancelled = true;
            std::mem::take(&mut state.waiters)
        };

        for waker in waiters {
            waker.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().cancelled
    }

    /// Completes once [`cancel`](Self::cancel) has been called on any clone.
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            token: self.clone(),
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancellationToken::cancelled`].
pub struct Cancelled {
    token: CancellationToken,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.token.state.borrow_mut();
        if state.cancelled {
            return Poll::Ready(());
        }

        if !state.waiters.iter().any(|w| w.will_wake(cx.waker())) {
            state.waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
