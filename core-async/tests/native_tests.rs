//! Integration tests for core-async on native platforms.

#![cfg(not(target_arch = "wasm32"))]

use core_async::sync::{self, CancelOnDrop, CancellationToken};
use core_async::{task, time};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_sleep_waits_at_least_duration() {
    let start = std::time::Instant::now();
    time::sleep(time::Duration::from_millis(30)).await;
    assert!(start.elapsed() >= time::Duration::from_millis(30));
}

#[tokio::test]
async fn test_spawn_detached_runs_to_completion() {
    let (tx, rx) = tokio::sync::oneshot::channel();

    task::spawn_detached(async move {
        let _ = tx.send(42);
    });

    assert_eq!(rx.await.expect("task dropped sender"), 42);
}

#[tokio::test]
async fn test_cancel_on_drop_stops_loop() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let guard = CancelOnDrop::new(CancellationToken::new());
    let token = guard.token();
    let counter = Arc::clone(&ticks);

    task::spawn_detached(async move {
        while !token.is_cancelled() {
            counter.fetch_add(1, Ordering::SeqCst);
            time::sleep(time::Duration::from_millis(5)).await;
        }
    });

    time::sleep(time::Duration::from_millis(30)).await;
    drop(guard);
    time::sleep(time::Duration::from_millis(20)).await;

    let after_cancel = ticks.load(Ordering::SeqCst);
    time::sleep(time::Duration::from_millis(30)).await;
    assert!(after_cancel > 0);
    assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test]
async fn test_cancelled_future_resolves() {
    let token = CancellationToken::new();
    let waiter = token.clone();

    task::spawn_detached(async move {
        time::sleep(time::Duration::from_millis(5)).await;
        token.cancel();
    });

    time::timeout(time::Duration::from_secs(1), waiter.cancelled())
        .await
        .expect("token was never cancelled");
}

#[tokio::test]
async fn test_watch_reexport() {
    let (tx, mut rx) = sync::watch::channel(false);
    tx.send_replace(true);
    rx.changed().await.expect("sender dropped");
    assert!(*rx.borrow());
}

#[test]
fn test_block_on_outside_runtime() {
    let value = core_async::runtime::block_on(async { 7 }).expect("runtime");
    assert_eq!(value, 7);
}

#[test]
fn test_now_millis_is_positive() {
    assert!(time::now_millis() > 0);
}
