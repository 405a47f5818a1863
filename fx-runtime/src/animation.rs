//! # Animation 模块
//!
//! 基于 class 的动画词汇。
//!
//! Runtime 不负责绘制：一个动画就是元素上的一组 class，
//! 具体视觉（背景擦入、边框描绘、缩放等）由宿主样式表决定。
//!
//! 每种动画都有一个前缀，撤销时按前缀移除，
//! 因此撤销不需要知道应用时用的参数。

use serde::{Deserialize, Serialize};

/// 动画
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Animation {
    /// 接受标记（对勾图标滑入）
    Accepted,
    /// 拒绝标记（叉号图标滑入）
    Rejected,
    /// 背景从左到右擦入
    Background { color: String },
    /// 边框顺时针描绘
    Border {
        color: String,
        #[serde(default)]
        thickness: Option<String>,
    },
    /// 缩放（百分比）
    Scale { percent: u32 },
    /// 文本样式
    TextStyle { style: String },
    /// 命名效果（如 `pulse`）
    Effect { name: String },
}

/// 动画种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Accepted,
    Rejected,
    Background,
    Border,
    Scale,
    TextStyle,
    Effect,
}

impl AnimationKind {
    /// 该种类所有 class 共享的前缀
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Accepted => "reveal-accepted",
            Self::Rejected => "reveal-rejected",
            Self::Background => "anim-bg",
            Self::Border => "anim-border",
            Self::Scale => "anim-scale",
            Self::TextStyle => "anim-text",
            Self::Effect => "anim-effect",
        }
    }

    /// class 是否属于该种类
    pub fn owns_class(self, class: &str) -> bool {
        let prefix = self.prefix();
        class == prefix
            || class
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

impl Animation {
    pub fn kind(&self) -> AnimationKind {
        match self {
            Self::Accepted => AnimationKind::Accepted,
            Self::Rejected => AnimationKind::Rejected,
            Self::Background { .. } => AnimationKind::Background,
            Self::Border { .. } => AnimationKind::Border,
            Self::Scale { .. } => AnimationKind::Scale,
            Self::TextStyle { .. } => AnimationKind::TextStyle,
            Self::Effect { .. } => AnimationKind::Effect,
        }
    }

    /// 应用该动画需要添加的 class
    pub fn class_names(&self) -> Vec<String> {
        let prefix = self.kind().prefix();
        let variant = |value: &str| format!("{}-{}", prefix, class_token(value));

        match self {
            Self::Accepted | Self::Rejected => vec![prefix.to_string()],
            Self::Background { color } => vec![prefix.to_string(), variant(color)],
            Self::Border { color, thickness } => {
                let mut classes = vec![prefix.to_string(), variant(color)];
                if let Some(thickness) = thickness {
                    classes.push(variant(thickness));
                }
                classes
            }
            Self::Scale { percent } => vec![prefix.to_string(), variant(&percent.to_string())],
            Self::TextStyle { style } => vec![prefix.to_string(), variant(style)],
            Self::Effect { name } => vec![prefix.to_string(), variant(name)],
        }
    }
}

/// 把任意字符串规整为 class 片段：小写，非字母数字替换为 `-`，去掉首尾 `-`
fn class_token(value: &str) -> String {
    let token: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    token.trim_matches('-').to_string()
}
