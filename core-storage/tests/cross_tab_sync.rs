//! Two tabs sharing one origin's storage.

#![cfg(not(target_arch = "wasm32"))]

use std::sync::Arc;
use std::time::Duration;

use bridge_desktop::MemoryKeyValueStore;
use bridge_traits::KeyValueStore;
use core_runtime::events::{ChangeSource, CoreEvent, EventBus, StorageEvent};
use core_storage::PersistentValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct UserProfile {
    name: String,
}

fn two_tabs() -> (Arc<dyn KeyValueStore>, Arc<dyn KeyValueStore>) {
    let tab_a = MemoryKeyValueStore::new();
    let tab_b = tab_a.open_peer();
    (Arc::new(tab_a), Arc::new(tab_b))
}

#[tokio::test]
async fn test_save_in_one_tab_updates_the_other() {
    let (tab_a, tab_b) = two_tabs();

    let in_a = PersistentValue::mount("userProfile", UserProfile::default(), tab_a, None).await;
    let in_b = PersistentValue::mount("userProfile", UserProfile::default(), tab_b, None).await;
    let mut watch_b = in_b.subscribe();

    assert!(in_a
        .save(UserProfile {
            name: "X".to_string()
        })
        .await);

    tokio::time::timeout(Duration::from_millis(500), watch_b.changed())
        .await
        .expect("tab B notified")
        .expect("tab B state alive");

    assert_eq!(
        in_b.value(),
        UserProfile {
            name: "X".to_string()
        }
    );
}

#[tokio::test]
async fn test_remove_in_one_tab_resets_the_other() {
    let (tab_a, tab_b) = two_tabs();
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let in_a = PersistentValue::mount("streak", 0u32, tab_a, None).await;
    let in_b = PersistentValue::mount("streak", 0u32, tab_b, Some(bus)).await;

    assert!(in_a.save(7).await);
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Storage(StorageEvent::Saved {
            key: "streak".into(),
            source: ChangeSource::Remote,
        })
    );
    assert_eq!(in_b.value(), 7);

    assert!(in_a.remove().await);
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Storage(StorageEvent::Removed {
            key: "streak".into(),
            source: ChangeSource::Remote,
        })
    );
    assert_eq!(in_b.value(), 0);
}

#[tokio::test]
async fn test_other_keys_are_ignored() {
    let (tab_a, tab_b) = two_tabs();

    let in_b = PersistentValue::mount("streak", 3u32, tab_b, None).await;
    tab_a.set_item("unrelated", "1").await.unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(in_b.value(), 3);
}

#[tokio::test]
async fn test_own_writes_do_not_echo() {
    let (tab_a, _tab_b) = two_tabs();
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let in_a = PersistentValue::mount("streak", 0u32, tab_a, Some(bus)).await;
    assert!(in_a.save(1).await);

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Storage(StorageEvent::Saved {
            key: "streak".into(),
            source: ChangeSource::Local,
        })
    );
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(events.try_recv().is_err());
}
