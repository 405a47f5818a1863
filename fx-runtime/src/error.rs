//! # Error 模块
//!
//! 定义 fx-runtime 中使用的错误类型。
//!
//! ## 错误分级
//!
//! - `EffectError`：效果回调内部的失败，由 Runner 捕获并记录，**从不**中断导航
//! - `RunnerError`：Runner 生命周期相关的调用方错误（如 Deck 未就绪时启动）

use thiserror::Error;

use crate::event::SlideKey;

/// 效果执行错误
///
/// 由效果回调或 [`ElementHandle`](crate::element::ElementHandle) 的操作返回。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    /// 找不到目标元素（未绑定、Deck 无法解析，或元素已被销毁）
    #[error("幻灯片 {slide} 的片段 {fragment} 没有可用的目标元素")]
    ElementNotFound { slide: SlideKey, fragment: usize },

    /// 元素缺少所需属性
    #[error("元素缺少属性 '{name}'")]
    MissingAttribute { name: String },

    /// 回调自身报告的失败
    #[error("效果执行失败: {message}")]
    Failed { message: String },
}

impl EffectError {
    /// 创建通用失败
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Runner 错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunnerError {
    /// Deck 导航引擎尚未就绪
    #[error("Deck '{deck}' 尚未就绪，无法启动 FragmentRunner")]
    DeckNotReady { deck: String },

    /// 配置无效
    #[error("无效的配置: {message}")]
    Config { message: String },
}

/// fx-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// 效果错误
    #[error("效果错误: {0}")]
    Effect(#[from] EffectError),

    /// Runner 错误
    #[error("Runner 错误: {0}")]
    Runner(#[from] RunnerError),
}

/// 效果回调的返回类型
pub type EffectResult = Result<(), EffectError>;

/// Result 类型别名
pub type FxResult<T> = Result<T, FxError>;
