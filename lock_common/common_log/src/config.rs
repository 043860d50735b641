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

use serde::Deserialize;
use std::path::PathBuf;

fn default_console_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Optional stderr appender attached to the root logger
    #[serde(default)]
    pub console: Option<ConsoleConfig>,
    #[serde(default)]
    pub loggers: Vec<LoggerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    pub path_prefix: String,
    pub log_directory: String,
    pub log_file_name: String,
    pub max_file_size: u64,
    pub max_zip_count: u32,
    pub level: String,
}

impl LogConfig {
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string(path.into())?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: LogConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Console-only configuration at `level`
    pub fn console(level: &str) -> Self {
        LogConfig {
            console: Some(ConsoleConfig { level: level.to_string() }),
            loggers: Vec::new(),
        }
    }

    pub fn get_logger_config(&self, path_prefix: &str) -> Option<&LoggerConfig> {
        self.loggers.iter().find(|l| path_prefix.starts_with(&l.path_prefix))
    }

    pub fn get_root_config(&self) -> Option<&LoggerConfig> {
        self.loggers.iter().find(|l| l.path_prefix == "root")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
console:
  level: debug
loggers:
  - path_prefix: root
    log_directory: logs
    log_file_name: root.log
    max_file_size: 10485760
    max_zip_count: 6
    level: info
  - path_prefix: reentrant_lock
    log_directory: logs
    log_file_name: lock.log
    max_file_size: 10485760
    max_zip_count: 3
    level: debug
"#;

    #[test]
    fn test_parse_yaml() {
        let config = LogConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.loggers.len(), 2);
        assert_eq!(config.console.unwrap().level, "debug");
    }

    #[test]
    fn test_logger_lookup_by_module_path() {
        let config = LogConfig::from_yaml_str(SAMPLE).unwrap();
        let lock = config.get_logger_config("reentrant_lock::lease").unwrap();
        assert_eq!(lock.log_file_name, "lock.log");
        assert_eq!(config.get_root_config().unwrap().log_file_name, "root.log");
        assert!(config.get_logger_config("store_client").is_none());
    }

    #[test]
    fn test_console_level_defaults_to_info() {
        let config = LogConfig::from_yaml_str("console: {}\n").unwrap();
        assert_eq!(config.console.unwrap().level, "info");
        assert!(config.loggers.is_empty());
    }
}
