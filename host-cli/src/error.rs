//! # Error 模块
//!
//! host-cli 的错误类型。二进制入口统一转成 `anyhow::Error` 并附加上下文。

use thiserror::Error;

use fx_runtime::RunnerError;

/// Deck 脚本错误
#[derive(Error, Debug)]
pub enum ScriptError {
    /// JSON 解析失败
    #[error("Deck 脚本解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 读取文件失败
    #[error("读取 Deck 脚本失败: {0}")]
    Io(#[from] std::io::Error),

    /// 引用了不存在的幻灯片
    #[error("效果引用了不存在的幻灯片: {slide}")]
    UnknownSlide { slide: String },

    /// 引用了不存在的元素
    #[error("引用了不存在的元素: '{element}'")]
    UnknownElement { element: String },

    /// 片段索引越界
    #[error("幻灯片 {slide} 只有 {count} 个片段，无法引用片段 {fragment}")]
    FragmentOutOfRange {
        slide: String,
        fragment: usize,
        count: usize,
    },

    /// 重复定义
    #[error("重复定义: {what} '{name}'")]
    Duplicate { what: &'static str, name: String },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

/// host-cli 统一错误类型
#[derive(Error, Debug)]
pub enum HostError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}
