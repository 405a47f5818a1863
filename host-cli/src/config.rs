//! # Config 模块
//!
//! 无界面宿主的配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (host.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use fx_runtime::RunnerConfig;
use tracing::Level;

use crate::error::ConfigError;

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 结束时是否以 JSON 输出效果日志
    #[serde(default)]
    pub print_log: bool,

    /// Runner 配置
    #[serde(default)]
    pub runner: RunnerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            print_log: false,
            runner: RunnerConfig::default(),
        }
    }
}

impl HostConfig {
    /// 从 JSON 文本解析并验证
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 命令行覆盖
    pub fn apply_overrides(&mut self, log_level: Option<&str>, print_log: bool) {
        if let Some(level) = log_level {
            self.log_level = level.to_string();
        }
        if print_log {
            self.print_log = true;
        }
    }

    /// 日志级别
    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|_| {
            ConfigError::ValidationFailed(format!("未知的日志级别: {}", self.log_level))
        })
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level()?;
        self.runner
            .validate()
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))
    }
}
