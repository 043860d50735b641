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

use chrono::{DateTime, Local};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::filter::threshold::ThresholdFilter;
use log4rs::{
    append::rolling_file::RollingFileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config, Handle,
};
use std::env;
use std::path::PathBuf;
use crate::config::{LogConfig, LoggerConfig};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S:%3f)} {l} [{M}:{L}] - {m}{n}";
const CONSOLE_APPENDER: &str = "console";
const ROOT_APPENDER: &str = "root_appender";

pub struct Logger {
    handle: Handle,
}

impl Logger {
    pub fn new_from_yaml(config_path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = LogConfig::from_yaml(config_path)?;
        Self::new_from_config(config)
    }

    pub fn new_from_config(config: LogConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let handle = log4rs::init_config(Self::build(&config)?)?;
        Ok(Self { handle })
    }

    /// Swap the active configuration without re-registering the global logger
    pub fn reconfigure(&self, config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
        self.handle.set_config(Self::build(config)?);
        Ok(())
    }

    pub(crate) fn build(config: &LogConfig) -> Result<Config, Box<dyn std::error::Error>> {
        let mut builder = Config::builder();
        let mut root_appenders = Vec::new();
        let mut root_level = LevelFilter::Off;

        if let Some(console) = &config.console {
            let level = parse_level(&console.level);
            let appender = ConsoleAppender::builder()
                .target(Target::Stderr)
                .encoder(Box::new(PatternEncoder::new(PATTERN)))
                .build();
            builder = builder.appender(
                Appender::builder()
                    .filter(Box::new(ThresholdFilter::new(level)))
                    .build(CONSOLE_APPENDER, Box::new(appender)),
            );
            root_appenders.push(CONSOLE_APPENDER.to_string());
            root_level = root_level.max(level);
        }

        for logger_config in config.loggers.iter().filter(|l| l.path_prefix != "root") {
            let appender_name = format!("{}_appender", logger_config.path_prefix);
            builder = builder.appender(
                Appender::builder().build(&appender_name, Box::new(create_appender(logger_config)?)),
            );
            builder = builder.logger(
                log4rs::config::Logger::builder()
                    .appender(appender_name)
                    .additive(false)
                    .build(logger_config.path_prefix.clone(), parse_level(&logger_config.level)),
            );
        }

        if let Some(root_config) = config.get_root_config() {
            builder = builder.appender(
                Appender::builder().build(ROOT_APPENDER, Box::new(create_appender(root_config)?)),
            );
            root_appenders.push(ROOT_APPENDER.to_string());
            root_level = root_level.max(parse_level(&root_config.level));
        }

        if root_appenders.is_empty() {
            root_level = LevelFilter::Info;
        }
        let root = Root::builder().appenders(root_appenders).build(root_level);
        Ok(builder.build(root)?)
    }
}

fn output_dir() -> String {
    env::var("LOG_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string())
}

fn create_appender(config: &LoggerConfig) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    // An absolute log_directory ignores LOG_OUTPUT_DIR
    let log_directory = PathBuf::from(output_dir()).join(&config.log_directory).display().to_string();
    std::fs::create_dir_all(&log_directory)?;

    // Archives of one process run share a start timestamp
    let now: DateTime<Local> = Local::now();
    let formatted_time = now.format("%Y%m%d%H%M%S%3f").to_string();

    let log_file = format!("{}/{}", log_directory, config.log_file_name);
    let archived_log_pattern = format!(
        "{}/{}-{{}}-{}.gz",
        log_directory, config.log_file_name, formatted_time
    );

    let size_trigger = SizeTrigger::new(config.max_file_size);
    let roller = FixedWindowRoller::builder().build(&archived_log_pattern, config.max_zip_count)?;
    let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(log_file, Box::new(compound_policy))?;

    Ok(appender)
}

pub(crate) fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}
