#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reentrant_lock::{LeaseOptions, LockStore, MemoryStore, StoreError};

pub fn setup() {
    let _ = common_log::init_console("debug");
}

/// D = 6s renewed every second
pub fn six_tick_lease() -> LeaseOptions {
    LeaseOptions::new(Duration::from_secs(6), 6).unwrap()
}

/// MemoryStore that counts every call made through the capability
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub set_if_absent: AtomicUsize,
    pub extend: AtomicUsize,
    pub delete: AtomicUsize,
    pub compare_and_delete: AtomicUsize,
}

impl RecordingStore {
    pub fn shared() -> Arc<RecordingStore> {
        Arc::new(RecordingStore::default())
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LockStore for RecordingStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, StoreError> {
        self.set_if_absent.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn extend(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.extend.fetch_add(1, Ordering::SeqCst);
        self.inner.extend(key, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        self.delete.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<u64, StoreError> {
        self.compare_and_delete.fetch_add(1, Ordering::SeqCst);
        self.inner.compare_and_delete(key, expected).await
    }
}

/// MemoryStore whose writes land immediately but whose replies arrive after `delay`
#[derive(Debug)]
pub struct SlowCommitStore {
    pub inner: RecordingStore,
    pub delay: Duration,
}

impl SlowCommitStore {
    pub fn shared(delay: Duration) -> Arc<SlowCommitStore> {
        Arc::new(SlowCommitStore { inner: RecordingStore::default(), delay })
    }
}

#[async_trait]
impl LockStore for SlowCommitStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let committed = self.inner.set_if_absent(key, value, ttl).await;
        tokio::time::sleep(self.delay).await;
        committed
    }

    async fn extend(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.inner.extend(key, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        self.inner.delete(key).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<u64, StoreError> {
        let deleted = self.inner.compare_and_delete(key, expected).await;
        tokio::time::sleep(self.delay).await;
        deleted
    }
}
