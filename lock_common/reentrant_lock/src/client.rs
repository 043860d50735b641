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
use lock_config::{LockSettings, LOCK_SETTINGS};
use redis::Script;
use store_client::{RedisClient, StoreError};

use super::error::{DistributedLockError, Result};
use super::scripts::RELEASE_LOCK;
use super::store::LockStore;

/// Redis client side encapsulation, providing distributed lock related operations
#[derive(Debug, Clone)]
pub struct LockRedisClient {
    client: RedisClient,
    release_script: Script,
}

impl LockRedisClient {
    /// Use the process-wide Redis client, connecting through `REDIS_URL` on first use
    pub async fn new() -> Result<Self> {
        let client = RedisClient::get_instance().await?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: RedisClient) -> Self {
        Self {
            client,
            release_script: Script::new(RELEASE_LOCK),
        }
    }

    /// Connect to the Redis server named in `settings`
    pub async fn connect(settings: &LockSettings) -> Result<Self> {
        let client = RedisClient::connect(&settings.redis.url).await?;
        Ok(Self::from_client(client))
    }

    /// Connect with the process-wide settings published through `LOCK_SETTINGS`
    pub async fn from_global_settings() -> Result<Self> {
        let settings = LOCK_SETTINGS.get_instance().map_err(DistributedLockError::Config)?;
        Self::connect(settings).await
    }

}

#[async_trait]
impl LockStore for LockRedisClient {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>) -> std::result::Result<bool, StoreError> {
        self.client.set_nx(key, value, ttl).await
    }

    async fn extend(&self, key: &str, ttl: Duration) -> std::result::Result<bool, StoreError> {
        self.client.pexpire(key, ttl).await
    }

    async fn delete(&self, key: &str) -> std::result::Result<u64, StoreError> {
        self.client.del(key).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> std::result::Result<u64, StoreError> {
        let deleted = self.client.eval_script(&self.release_script, key, &[expected]).await?;
        Ok(deleted.max(0) as u64)
    }
}
