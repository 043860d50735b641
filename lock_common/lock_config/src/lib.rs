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

/// Configuration for the Redis-backed reentrant lock.
///
/// Settings are read from a YAML file, optionally overridden by environment
/// variables (a `.env` file in the working directory is honoured), and held in
/// a process-wide [`ConfigSingleton`].
///
/// # Example
///
/// ```no_run
/// use lock_config::{LockSettings, LOCK_SETTINGS};
///
/// LOCK_SETTINGS.initialize("lock.yaml").expect("Failed to load config");
/// let settings: &LockSettings = LOCK_SETTINGS.get_instance().expect("Config not initialized");
/// println!("lease {} ms against {}", settings.lease.duration_ms, settings.redis.url);
/// ```
pub mod manager;
pub mod settings;

pub use manager::ConfigSingleton;
pub use settings::{LeaseSettings, LockSettings, RedisSettings};

/// Process-wide lock settings
pub static LOCK_SETTINGS: ConfigSingleton<LockSettings> = ConfigSingleton::new();
