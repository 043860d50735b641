mod common;

use std::sync::Arc;

use common::{setup, six_tick_lease, RecordingStore};
use lock_config::LockSettings;
use reentrant_lock::{CancellationToken, DistributedLockError, LeaseOptions, LockStore, ReentrantLock};

#[tokio::test]
async fn test_second_owner_is_rejected() {
    setup();
    let store = RecordingStore::shared();
    let ctx = CancellationToken::new();
    let lock_a = ReentrantLock::new(store.clone(), "res", "t1", six_tick_lease());
    let lock_b = ReentrantLock::new(store.clone(), "res", "t2", six_tick_lease());

    assert!(lock_a.acquire(&ctx).await.unwrap());
    assert_eq!(store.inner.get("res").as_deref(), Some("t1"));

    match lock_b.acquire(&ctx).await {
        Err(DistributedLockError::LockContention(key)) => assert_eq!(key, "res"),
        other => panic!("Expected LockContention, got {:?}", other),
    }
    assert_eq!(store.inner.get("res").as_deref(), Some("t1"));
    assert!(!lock_b.is_held().await);

    lock_a.release(&ctx).await.unwrap();
    assert!(lock_b.acquire(&ctx).await.unwrap());
    assert_eq!(store.inner.get("res").as_deref(), Some("t2"));
    lock_b.release(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_reentrant_acquire_and_release() {
    setup();
    let store = RecordingStore::shared();
    let ctx = CancellationToken::new();
    let lock = ReentrantLock::new(store.clone(), "res", "t1", six_tick_lease());

    lock.acquire(&ctx).await.unwrap();
    lock.acquire(&ctx).await.unwrap();
    assert_eq!(lock.reentrancy_count().await, 2);
    assert_eq!(RecordingStore::count(&store.set_if_absent), 1);

    lock.release(&ctx).await.unwrap();
    assert_eq!(lock.reentrancy_count().await, 1);
    assert_eq!(RecordingStore::count(&store.compare_and_delete), 0);
    assert_eq!(store.inner.get("res").as_deref(), Some("t1"));

    lock.release(&ctx).await.unwrap();
    assert_eq!(lock.reentrancy_count().await, 0);
    assert_eq!(RecordingStore::count(&store.compare_and_delete), 1);
    assert_eq!(store.inner.get("res"), None);
}

#[tokio::test]
async fn test_nested_pairs_make_one_round_trip_each_way() {
    setup();
    for depth in 1..=5 {
        let store = RecordingStore::shared();
        let ctx = CancellationToken::new();
        let lock = ReentrantLock::new(store.clone(), "res", "t1", six_tick_lease());

        for _ in 0..depth {
            lock.acquire(&ctx).await.unwrap();
        }
        for _ in 0..depth {
            lock.release(&ctx).await.unwrap();
        }

        assert_eq!(RecordingStore::count(&store.set_if_absent), 1);
        assert_eq!(RecordingStore::count(&store.compare_and_delete), 1);
        assert_eq!(RecordingStore::count(&store.delete), 0);
        assert_eq!(store.inner.get("res"), None);
    }
}

#[tokio::test]
async fn test_release_after_takeover_keeps_new_owner() {
    setup();
    let store = RecordingStore::shared();
    let ctx = CancellationToken::new();
    let lock = ReentrantLock::new(store.clone(), "res", "t1", six_tick_lease());
    lock.acquire(&ctx).await.unwrap();

    // Lease lost and re-acquired elsewhere
    store.inner.delete("res").await.unwrap();
    store.inner.set_if_absent("res", "t2", None).await.unwrap();

    match lock.release(&ctx).await {
        Err(DistributedLockError::LockOwnership(key)) => assert_eq!(key, "res"),
        other => panic!("Expected LockOwnership, got {:?}", other),
    }
    assert_eq!(store.inner.get("res").as_deref(), Some("t2"));
    assert!(!lock.is_held().await);

    // Unheld now: a further release is a no-op
    assert!(lock.release(&ctx).await.unwrap());
    assert_eq!(RecordingStore::count(&store.compare_and_delete), 1);
}

#[tokio::test]
async fn test_release_of_unheld_handle() {
    setup();
    let store = RecordingStore::shared();
    let lock = ReentrantLock::new(store.clone(), "res", "t1", six_tick_lease());

    assert!(lock.release(&CancellationToken::new()).await.unwrap());
    assert_eq!(RecordingStore::count(&store.compare_and_delete), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_handle_reenters_across_tasks() {
    setup();
    let store = RecordingStore::shared();
    let lock = Arc::new(ReentrantLock::with_random_value(store.clone(), "res", LeaseOptions::default()));
    let ctx = CancellationToken::new();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let lock = lock.clone();
        let ctx = ctx.clone();
        tasks.push(tokio::spawn(async move { lock.acquire(&ctx).await.unwrap() }));
    }
    for task in tasks {
        assert!(task.await.unwrap());
    }

    assert_eq!(lock.reentrancy_count().await, 8);
    assert_eq!(RecordingStore::count(&store.set_if_absent), 1);
    assert_eq!(store.inner.get("res").as_deref(), Some(lock.value()));

    for _ in 0..8 {
        lock.release(&ctx).await.unwrap();
    }
    assert_eq!(store.inner.get("res"), None);
    assert_eq!(RecordingStore::count(&store.compare_and_delete), 1);
}

#[tokio::test]
async fn test_random_values_are_distinct_owners() {
    setup();
    let store = RecordingStore::shared();
    let ctx = CancellationToken::new();
    let first = ReentrantLock::with_random_value(store.clone(), "res", LeaseOptions::default());
    let second = ReentrantLock::with_random_value(store.clone(), "res", LeaseOptions::default());
    assert_ne!(first.value(), second.value());

    first.acquire(&ctx).await.unwrap();
    assert!(matches!(
        second.acquire(&ctx).await,
        Err(DistributedLockError::LockContention(_))
    ));
    first.release(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_options_from_configuration() {
    setup();
    let settings = LockSettings::from_yaml_str("lease:\n  duration_ms: 3000\n  renewal_ratio: 3\n").unwrap();
    let options = LeaseOptions::try_from(&settings).unwrap();

    let lock = ReentrantLock::new(RecordingStore::shared(), "res", "t1", options);
    assert_eq!(lock.options().renewal_interval(), std::time::Duration::from_secs(1));
    assert_eq!(lock.key(), "res");
    assert_eq!(lock.value(), "t1");
}
