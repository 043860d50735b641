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

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use store_client::StoreError;

/// Atomic single-key operations the lock protocol needs from its store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Set `key = value` only if `key` is absent. `ttl = None` means no expiry.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, StoreError>;

    /// Refresh the TTL of an existing key. Returns `false` if the key is absent.
    async fn extend(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Unconditional delete, returns the number of removed keys.
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;

    /// Delete `key` only if it currently holds `expected`, as one atomic unit.
    /// Returns the number of removed keys, 0 when the value did not match.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<u64, StoreError>;
}
