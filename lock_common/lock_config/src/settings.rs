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

use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::manager::LoadedConfig;

pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const LEASE_DURATION_ENV: &str = "LOCK_LEASE_DURATION_MS";
pub const RENEWAL_RATIO_ENV: &str = "LOCK_RENEWAL_RATIO";

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_duration_ms() -> u64 {
    10_000
}

fn default_renewal_ratio() -> u32 {
    6
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockSettings {
    #[serde(default)]
    pub redis: RedisSettings,
    #[serde(default)]
    pub lease: LeaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaseSettings {
    /// Lease TTL written on every renewal
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Renewals per lease period
    #[serde(default = "default_renewal_ratio")]
    pub renewal_ratio: u32,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self { url: default_redis_url() }
    }
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            renewal_ratio: default_renewal_ratio(),
        }
    }
}

impl LeaseSettings {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

fn env_override<T: FromStr>(key: &str) -> Result<Option<T>, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(None),
    }
}

impl LockSettings {
    pub fn from_yaml_str(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse YAML: {}", e))
    }

    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_str(&contents)
    }

    /// Overlay `REDIS_URL`, `LOCK_LEASE_DURATION_MS` and `LOCK_RENEWAL_RATIO`.
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        if let Ok(path) = dotenv::dotenv() {
            info!("load .env file: {}", path.display());
        }
        if let Some(url) = env_override::<String>(REDIS_URL_ENV)? {
            debug!("{} overrides redis url", REDIS_URL_ENV);
            self.redis.url = url;
        }
        if let Some(duration_ms) = env_override(LEASE_DURATION_ENV)? {
            self.lease.duration_ms = duration_ms;
        }
        if let Some(ratio) = env_override(RENEWAL_RATIO_ENV)? {
            self.lease.renewal_ratio = ratio;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.redis.url.trim().is_empty() {
            return Err("redis.url must not be empty".to_string());
        }
        if self.lease.duration_ms == 0 {
            return Err("lease.duration_ms must be greater than 0".to_string());
        }
        if self.lease.renewal_ratio == 0 {
            return Err("lease.renewal_ratio must be greater than 0".to_string());
        }
        if self.lease.duration_ms < u64::from(self.lease.renewal_ratio) {
            return Err("lease.duration_ms must be at least lease.renewal_ratio milliseconds".to_string());
        }
        Ok(())
    }
}

impl LoadedConfig for LockSettings {
    fn prepare(&mut self) -> Result<(), String> {
        self.apply_env_overrides()?;
        self.validate()
    }
}
