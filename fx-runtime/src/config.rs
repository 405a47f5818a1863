//! # Config 模块
//!
//! FragmentRunner 的运行配置。所有字段都有默认值，
//! 可以从 JSON 中只覆盖需要的部分。

use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Runner 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// 效果日志最大记录数
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// 是否捕获回调中的 panic
    ///
    /// 关闭后 panic 会直接传播给 Deck 的事件循环，仅用于调试。
    #[serde(default = "default_catch_panics")]
    pub catch_panics: bool,

    /// 重入事件上限
    ///
    /// 同时约束两处：回调执行期间队列中的事件数，以及单次分发连带处理的重入事件总数。
    /// 超出的事件被丢弃并记录警告，回调与导航互相触发时分发也能返回。
    #[serde(default = "default_max_queued_events")]
    pub max_queued_events: usize,
}

fn default_log_capacity() -> usize {
    1000
}

fn default_catch_panics() -> bool {
    true
}

fn default_max_queued_events() -> usize {
    64
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            catch_panics: default_catch_panics(),
            max_queued_events: default_max_queued_events(),
        }
    }
}

impl RunnerConfig {
    /// 从 JSON 字符串加载
    pub fn from_json(json: &str) -> Result<Self, RunnerError> {
        let config: Self = serde_json::from_str(json).map_err(|e| RunnerError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.max_queued_events == 0 {
            return Err(RunnerError::Config {
                message: "max_queued_events 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}
