//! # State 模块
//!
//! Runner 的显示状态。
//!
//! 对每个效果键记录 "show 已触发、hide 尚未触发"。Deck 发出重复事件时，
//! 依靠该标记保证同一效果不会被重复应用或重复撤销。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::event::{EffectKey, SlideKey};

/// Runner 状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerState {
    /// 当前处于 "已显示" 的效果键
    shown: BTreeSet<EffectKey>,
}

impl RunnerState {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否已显示
    pub fn is_shown(&self, key: &EffectKey) -> bool {
        self.shown.contains(key)
    }

    /// 标记为已显示，返回之前是否未显示
    pub fn mark_shown(&mut self, key: EffectKey) -> bool {
        self.shown.insert(key)
    }

    /// 标记为未显示，返回之前是否已显示
    pub fn mark_hidden(&mut self, key: &EffectKey) -> bool {
        self.shown.remove(key)
    }

    /// 某张幻灯片上已显示的效果数
    pub fn shown_on(&self, slide: &SlideKey) -> usize {
        self.shown.iter().filter(|k| &k.slide == slide).count()
    }

    /// 所有已显示的键（有序）
    pub fn shown_keys(&self) -> impl Iterator<Item = &EffectKey> {
        self.shown.iter()
    }

    /// 清空状态（teardown / 重新初始化）
    pub fn clear(&mut self) {
        self.shown.clear();
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_shown_and_hidden() {
        let mut state = RunnerState::new();
        let key = EffectKey::new("s1", 0);

        assert!(state.mark_shown(key.clone()));
        assert!(!state.mark_shown(key.clone()));
        assert!(state.is_shown(&key));

        assert!(state.mark_hidden(&key));
        assert!(!state.mark_hidden(&key));
        assert!(state.is_empty());
    }

    #[test]
    fn test_shown_on_slide() {
        let mut state = RunnerState::new();
        state.mark_shown(EffectKey::new("s1", 0));
        state.mark_shown(EffectKey::new("s1", 1));
        state.mark_shown(EffectKey::new(SlideKey::Index(2), 0));

        assert_eq!(state.shown_on(&SlideKey::id("s1")), 2);
        assert_eq!(state.shown_on(&SlideKey::Index(2)), 1);
        assert_eq!(state.len(), 3);

        state.clear();
        assert!(state.is_empty());
    }
}
