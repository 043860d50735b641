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

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::info;
use redis::aio::ConnectionManager;
use redis::Client;
use tokio::sync::Mutex;

use crate::error::StoreError;

lazy_static! {
    static ref REDIS_CLIENT: Arc<Mutex<Option<RedisClient>>> = Arc::new(Mutex::new(None));
}

/// Environment variable holding the Redis connection address
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Cloneable async Redis client. Clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    pub(crate) client: Client,
    pub(crate) manager: ConnectionManager,
}

impl RedisClient {
    /// Open a client for `redis_url` and establish the managed connection
    ///
    /// # Errors
    /// * `StoreError::ConnectionError` - If the URL is invalid or the server is unreachable.
    pub async fn connect(redis_url: &str) -> Result<RedisClient, StoreError> {
        let client = Client::open(redis_url).map_err(StoreError::ConnectionError)?;
        let manager = ConnectionManager::new(client.clone())
            .await
            .map_err(StoreError::ConnectionError)?;
        info!("Connected to redis at {:?}", client.get_connection_info().addr);
        Ok(RedisClient { client, manager })
    }

    ///Get the RedisClient instance and automatically initialize it if the instance does not exist
    ///
    ///This method reads the Redis connection address from environment variable REDIS_URL
    ///If the instance does not exist, a new instance will be created and saved to the global static variable
    pub async fn get_instance() -> Result<RedisClient, StoreError> {
        let mut global_client = REDIS_CLIENT.lock().await;

        if let Some(client) = global_client.as_ref() {
            return Ok(client.clone());
        }

        let redis_url = std::env::var(REDIS_URL_ENV).map_err(|_| {
            StoreError::OperationError(format!("{} environment variable not set", REDIS_URL_ENV))
        })?;
        let client = RedisClient::connect(&redis_url).await?;
        *global_client = Some(client.clone());
        Ok(client)
    }
}

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("addr", &self.client.get_connection_info().addr)
            .finish_non_exhaustive()
    }
}
