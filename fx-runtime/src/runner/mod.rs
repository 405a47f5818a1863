//! # Runner 模块
//!
//! 片段效果的调度核心。
//!
//! ## 模块结构
//!
//! - [`engine`]：`FragmentRunner`，负责生命周期、幂等与顺序
//! - [`invoke`]：单次回调调用与故障隔离

pub mod engine;
pub mod invoke;

pub use engine::{Dispatch, FragmentRunner, StartOutcome};
