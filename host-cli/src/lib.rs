//! # Host CLI
//!
//! fx-runtime 的无界面宿主。
//!
//! 从 JSON 脚本构建 Deck 与效果，按步骤模拟导航，
//! 输出每一步触发的效果以及最终的元素状态。用于调试效果脚本和集成测试。
//!
//! ## 模块结构
//!
//! - [`script`]：Deck 脚本格式
//! - [`deck`]：无界面 Deck 实现
//! - [`effects`]：脚本效果 → 注册表
//! - [`audio`]：记录型音频输出
//! - [`session`]：一次演示会话
//! - [`config`]：宿主配置
//! - [`error`]：错误类型

pub mod audio;
pub mod config;
pub mod deck;
pub mod effects;
pub mod error;
pub mod script;
pub mod session;

pub use audio::{AudioEvent, LoggingAudio};
pub use config::HostConfig;
pub use deck::{HeadlessDeck, Position};
pub use effects::install_effects;
pub use error::{ConfigError, HostError, ScriptError};
pub use script::{DeckScript, EffectOp, EffectSpec, ElementSpec, SlideSpec};
pub use session::{Session, SessionSnapshot, Step, StepReport};
