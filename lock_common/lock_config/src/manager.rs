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

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

/// Hook for configuration types loaded through [`ConfigSingleton`].
pub trait LoadedConfig: DeserializeOwned + Send + Sync + 'static {
    /// Runs after parsing and before the value is published.
    fn prepare(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// A thread-safe singleton configuration manager that loads and provides access to configuration data.
///
/// Configuration is initialized only once; later calls to `initialize` leave
/// the published value untouched.
pub struct ConfigSingleton<T: LoadedConfig> {
    instance: OnceLock<T>,
}

impl<T: LoadedConfig> ConfigSingleton<T> {
    /// Creates a new, uninitialized `ConfigSingleton` instance.
    pub const fn new() -> Self {
        ConfigSingleton {
            instance: OnceLock::new(),
        }
    }

    /// Initializes the configuration singleton by loading and parsing a YAML configuration file.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if initialization was successful or if the singleton was already initialized.
    /// * `Err(String)` if the file cannot be opened, read, parsed, or fails `prepare`.
    pub fn initialize<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        if self.instance.get().is_some() {
            return Ok(());
        }

        let file = File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?;

        let mut contents = String::new();
        let mut reader = BufReader::new(file);
        reader
            .read_to_string(&mut contents)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config = serde_yaml::from_str(&contents).map_err(|e| format!("Failed to parse YAML: {}", e))?;
        self.initialize_with(config)
    }

    /// Publishes an already-built configuration.
    pub fn initialize_with(&self, mut config: T) -> Result<(), String> {
        if self.instance.get().is_some() {
            return Ok(());
        }
        config.prepare()?;
        let _ = self.instance.set(config);
        Ok(())
    }

    /// Retrieves a reference to the initialized configuration instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `initialize` has not been called successfully before calling this method.
    pub fn get_instance(&self) -> Result<&T, String> {
        self.instance.get().ok_or_else(|| "Configuration not initialized".to_string())
    }
}

impl<T: LoadedConfig> Default for ConfigSingleton<T> {
    fn default() -> Self {
        Self::new()
    }
}
