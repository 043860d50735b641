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

use redis::Script;

use crate::client::RedisClient;
use crate::error::StoreError;

/// Millisecond precision for `PX`/`PEXPIRE`; Redis rejects a zero expiry.
/// Durations past `u64::MAX` ms saturate.
fn as_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl RedisClient {
    /// Sets a key in Redis if it does not already exist.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to set.
    /// * `value` - The value to store.
    /// * `ttl` - An optional expiration; `None` leaves the key without expiry.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` if the key was set, `Ok(false)` if it already existed.
    ///
    /// # Errors
    ///
    /// * `StoreError::ConnectionError` - If the command could not be executed.
    pub async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("NX");
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(as_millis(ttl));
        }
        let reply: Option<String> = cmd.query_async(&mut conn).await?;
        Ok(reply.is_some())
    }

    /// Sets the expiration time for a key in Redis.
    ///
    /// # Returns
    ///
    /// Returns `Ok(false)` if the key does not exist.
    pub async fn pexpire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let updated: bool = redis::cmd("PEXPIRE")
            .arg(key)
            .arg(as_millis(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(updated)
    }

    /// Deletes a key from Redis and returns the number of removed keys.
    pub async fn del(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.manager.clone();
        let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed)
    }

    /// Runs a Lua script against a single key and returns its integer reply.
    ///
    /// The script is sent by SHA first and loaded on `NOSCRIPT`, so it executes
    /// as one atomic unit on the server.
    pub async fn eval_script(&self, script: &Script, key: &str, args: &[&str]) -> Result<i64, StoreError> {
        let mut conn = self.manager.clone();
        let mut invocation = script.prepare_invoke();
        invocation.key(key);
        for arg in args {
            invocation.arg(*arg);
        }
        let reply: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(reply)
    }
}
