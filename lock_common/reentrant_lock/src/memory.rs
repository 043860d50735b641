/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use store_client::StoreError;
use tokio::time::Instant;

use super::store::LockStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

/// In-process [`LockStore`] for single-node deployments and tests.
///
/// Expiry follows the tokio clock, so paused-time tests observe leases lapse.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live value of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key, now);
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Remaining lease of `key`, `None` if absent or without expiry
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key, now);
        entries
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn purge(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key, now);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(true)
    }

    async fn extend(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key, now);
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key, now);
        Ok(u64::from(entries.remove(key).is_some()))
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge(&mut entries, key, now);
        if entries.get(key).is_some_and(|entry| entry.value == expected) {
            entries.remove(key);
            return Ok(1);
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_if_absent_keeps_first_value() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("res", "t1", None).await.unwrap());
        assert!(!store.set_if_absent("res", "t2", None).await.unwrap());
        assert_eq!(store.get("res").as_deref(), Some("t1"));
        assert_eq!(store.ttl("res"), None);
    }

    #[tokio::test]
    async fn test_compare_and_delete_checks_owner() {
        let store = MemoryStore::new();
        store.set_if_absent("res", "t1", None).await.unwrap();

        assert_eq!(store.compare_and_delete("res", "t2").await.unwrap(), 0);
        assert_eq!(store.get("res").as_deref(), Some("t1"));
        assert_eq!(store.compare_and_delete("res", "t1").await.unwrap(), 1);
        assert_eq!(store.get("res"), None);
        assert_eq!(store.compare_and_delete("res", "t1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_and_extend_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.delete("res").await.unwrap(), 0);
        assert!(!store.extend("res", Duration::from_secs(1)).await.unwrap());

        store.set_if_absent("res", "t1", None).await.unwrap();
        assert_eq!(store.delete("res").await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_on_tokio_clock() {
        let store = MemoryStore::new();
        store.set_if_absent("res", "t1", Some(Duration::from_secs(2))).await.unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.extend("res", Duration::from_secs(2)).await.unwrap());
        assert_eq!(store.ttl("res"), Some(Duration::from_secs(2)));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("res"), None);
        assert!(store.set_if_absent("res", "t2", None).await.unwrap());
    }
}
