//! # Event 模块
//!
//! 定义片段导航事件及其寻址方式。
//!
//! ## 设计说明
//!
//! - `NavigationEvent` 是 Observer 从 Deck 原始通知翻译得到的语义化事件
//! - 事件只携带寻址信息（幻灯片 + 片段索引 + 方向），不解释片段含义
//! - 幻灯片既可以按线性索引寻址，也可以按稳定 id 寻址

use serde::{Deserialize, Serialize};
use std::fmt;

/// 幻灯片标识
///
/// 对 Runtime 而言是不透明的键，只用于匹配注册表。
///
/// JSON 中数字解析为 `Index`，字符串解析为 `Id`：
///
/// ```text
/// 1        -> SlideKey::Index(1)
/// "intro"  -> SlideKey::Id("intro")
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideKey {
    /// Deck 中的线性索引（从 0 开始）
    Index(usize),
    /// 幻灯片的稳定 id
    Id(String),
}

impl SlideKey {
    /// 创建索引键
    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }

    /// 创建 id 键
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }
}

impl fmt::Display for SlideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Id(id) => f.write_str(id),
        }
    }
}

impl From<usize> for SlideKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for SlideKey {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for SlideKey {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// Deck 对一张幻灯片的寻址
///
/// 每条通知都带有线性索引；若幻灯片声明了 id，一并携带。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlideAddress {
    /// 线性索引
    pub index: usize,
    /// 稳定 id（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SlideAddress {
    /// 仅按索引寻址
    pub fn at(index: usize) -> Self {
        Self { index, id: None }
    }

    /// 带 id 的寻址
    pub fn with_id(index: usize, id: impl Into<String>) -> Self {
        Self {
            index,
            id: Some(id.into()),
        }
    }

    /// 候选键，按解析优先级排列：先 `Id`，后 `Index`
    pub fn keys(&self) -> Vec<SlideKey> {
        let mut keys = Vec::with_capacity(2);
        if let Some(id) = &self.id {
            keys.push(SlideKey::Id(id.clone()));
        }
        keys.push(SlideKey::Index(self.index));
        keys
    }

    /// 主键（有 id 时为 `Id`，否则为 `Index`）
    pub fn primary_key(&self) -> SlideKey {
        match &self.id {
            Some(id) => SlideKey::Id(id.clone()),
            None => SlideKey::Index(self.index),
        }
    }
}

/// 导航方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// 片段显示（向前）
    Forward,
    /// 片段隐藏（向后）
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Backward => f.write_str("backward"),
        }
    }
}

/// 效果键：(幻灯片, 片段索引)
///
/// 注册表与 Runner 状态都以此为键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectKey {
    pub slide: SlideKey,
    pub fragment: usize,
}

impl EffectKey {
    pub fn new(slide: impl Into<SlideKey>, fragment: usize) -> Self {
        Self {
            slide: slide.into(),
            fragment,
        }
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.slide, self.fragment)
    }
}

/// 一次片段切换
///
/// 由 Observer 产生，Runner 同步消费后即丢弃。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    /// 幻灯片寻址
    pub slide: SlideAddress,
    /// 片段索引
    pub fragment_index: usize,
    /// 方向
    pub direction: Direction,
}

impl NavigationEvent {
    /// 创建向前事件
    pub fn forward(slide: SlideAddress, fragment_index: usize) -> Self {
        Self {
            slide,
            fragment_index,
            direction: Direction::Forward,
        }
    }

    /// 创建向后事件
    pub fn backward(slide: SlideAddress, fragment_index: usize) -> Self {
        Self {
            slide,
            fragment_index,
            direction: Direction::Backward,
        }
    }

    /// 主幻灯片键
    pub fn slide_key(&self) -> SlideKey {
        self.slide.primary_key()
    }

    /// 候选效果键，按解析优先级排列
    pub fn candidate_keys(&self) -> impl Iterator<Item = EffectKey> + '_ {
        self.slide
            .keys()
            .into_iter()
            .map(move |slide| EffectKey::new(slide, self.fragment_index))
    }
}
