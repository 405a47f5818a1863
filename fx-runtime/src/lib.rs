//! # FX Runtime
//!
//! 演示文稿片段效果的调度运行时。
//!
//! ## 架构概述
//!
//! `fx-runtime` 不依赖任何渲染引擎或 DOM。宿主通过 [`Deck`] 提供导航通知与
//! 片段元素，应用代码通过 [`EffectRegistry`] 为 (幻灯片, 片段) 注册一对
//! show/hide 回调，[`FragmentRunner`] 负责在正确的时机调用它们：
//!
//! ```text
//! Deck (Host)             NavigationObserver          FragmentRunner
//!   │                            │                          │
//!   │── DeckNotice ─────────────►│                          │
//!   │                            │── NavigationEvent ──────►│ registry.resolve()
//!   │                            │                          │ on_show / on_hide
//!   │◄──────────── ElementHandle 操作（style / class / text）──│
//! ```
//!
//! ## 核心保证
//!
//! - 同一效果不会被连续应用两次，也不会在未应用时被撤销
//! - 回调按事件到达顺序串行执行，回调中触发的导航会排队
//! - 单个回调失败（返回错误或 panic）只记录日志，不影响导航与其他效果
//!
//! ## 使用示例
//!
//! ```ignore
//! use fx_runtime::{Animation, AnimationKind, Effect, EffectRegistry, FragmentRunner};
//!
//! let registry = EffectRegistry::new();
//! registry.register("proof", 1, Effect::new(
//!     |el| el.animate(&Animation::Background { color: "yellow".into() }),
//!     |el| el.undo_animate(AnimationKind::Background),
//! ));
//!
//! let runner = FragmentRunner::new(registry.clone());
//! runner.start(deck)?;
//!
//! // 启动后仍可继续注册
//! registry.register("proof", 2, audio::cue_effect(sink));
//! ```
//!
//! ## 模块结构
//!
//! - [`event`]：幻灯片寻址与导航事件
//! - [`deck`]：宿主 Deck 契约与通知分发
//! - [`element`]：内容元素抽象与效果句柄
//! - [`animation`]：动画 class 词汇
//! - [`registry`]：效果注册表
//! - [`observer`]：Deck 通知 → 导航事件
//! - [`runner`]：调度引擎
//! - [`state`]：显示状态
//! - [`log`]：效果执行日志
//! - [`audio`]：片段音频提示
//! - [`config`]：Runner 配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod audio;
pub mod config;
pub mod deck;
pub mod element;
pub mod error;
pub mod event;
pub mod log;
pub mod observer;
pub mod registry;
pub mod runner;
pub mod state;

// 重导出核心类型
pub use animation::{Animation, AnimationKind};
pub use audio::{AUDIO_SRC_ATTRIBUTE, AudioSink, cue_effect};
pub use config::RunnerConfig;
pub use deck::{Deck, DeckId, DeckNotice, NoticeHub, NoticeKind, NoticeListener, SubscriptionId};
pub use element::{ContentNode, ElementHandle, MemoryNode, NodeSnapshot};
pub use error::{EffectError, EffectResult, FxError, FxResult, RunnerError};
pub use event::{Direction, EffectKey, NavigationEvent, SlideAddress, SlideKey};
pub use log::{EffectLog, EffectOutcome, EffectRecord};
pub use observer::{AttachOutcome, EventSink, NavigationObserver};
pub use registry::{Effect, EffectBinding, EffectRegistry};
pub use runner::{Dispatch, FragmentRunner, StartOutcome};
pub use state::RunnerState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let registry = EffectRegistry::new();
        registry.register(
            "intro",
            0,
            Effect::new(
                |el| el.animate(&Animation::Accepted),
                |el| el.undo_animate(AnimationKind::Accepted),
            ),
        );

        let runner = FragmentRunner::with_config(registry, RunnerConfig::default());
        assert!(!runner.is_started());

        let event = NavigationEvent::forward(SlideAddress::with_id(0, "intro"), 0);
        assert_eq!(runner.dispatch(&event), Dispatch::NotStarted);

        let _state = RunnerState::new();
        let _log = EffectLog::new();
    }
}
