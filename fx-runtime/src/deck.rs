//! # Deck 模块
//!
//! 宿主 Deck（幻灯片导航引擎）的契约。
//!
//! Runtime 不拥有导航引擎，只通过 [`Deck`] 使用三样东西：
//!
//! 1. 就绪信号：导航引擎是否已可用
//! 2. 订阅：片段显示/隐藏的原始通知
//! 3. 解析：(幻灯片, 片段索引) → 内容元素
//!
//! ```text
//! Deck                         Runtime
//!   │                             │
//!   │──── DeckNotice ───────────►│ NavigationObserver::translate
//!   │                             │ FragmentRunner::dispatch
//!   │◄─── resolve_fragment ──────│
//!   │                             │
//! ```

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::element::ContentNode;
use crate::event::SlideAddress;

/// Deck 实例标识，用于识别重复 attach
pub type DeckId = String;

/// 订阅标识
pub type SubscriptionId = u64;

/// 原始通知监听器
pub type NoticeListener = Rc<dyn Fn(&DeckNotice)>;

/// 原始通知种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// 片段显示
    FragmentShown,
    /// 片段隐藏
    FragmentHidden,
    /// 幻灯片切换（不涉及片段）
    SlideChanged,
}

/// Deck 发出的原始通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckNotice {
    pub kind: NoticeKind,
    pub slide: SlideAddress,
    /// 片段索引（`SlideChanged` 时为 None）
    #[serde(default)]
    pub fragment_index: Option<usize>,
}

impl DeckNotice {
    pub fn fragment_shown(slide: SlideAddress, fragment_index: usize) -> Self {
        Self {
            kind: NoticeKind::FragmentShown,
            slide,
            fragment_index: Some(fragment_index),
        }
    }

    pub fn fragment_hidden(slide: SlideAddress, fragment_index: usize) -> Self {
        Self {
            kind: NoticeKind::FragmentHidden,
            slide,
            fragment_index: Some(fragment_index),
        }
    }

    pub fn slide_changed(slide: SlideAddress) -> Self {
        Self {
            kind: NoticeKind::SlideChanged,
            slide,
            fragment_index: None,
        }
    }
}

/// 宿主 Deck
pub trait Deck {
    /// Deck 实例标识
    fn deck_id(&self) -> DeckId;

    /// 导航引擎是否已就绪
    fn is_ready(&self) -> bool;

    /// 订阅原始通知
    fn subscribe(&self, listener: NoticeListener) -> SubscriptionId;

    /// 取消订阅（id 不存在时无操作）
    fn unsubscribe(&self, id: SubscriptionId);

    /// 把片段解析为内容元素
    fn resolve_fragment(
        &self,
        slide: &SlideAddress,
        fragment_index: usize,
    ) -> Option<Rc<dyn ContentNode>>;
}

/// 通知分发器
///
/// 宿主实现 [`Deck`] 时可直接内嵌。
///
/// 发送时先对监听器列表做快照：
/// - 发送过程中取消的监听器本轮仍会被调用
/// - 发送过程中新增的监听器从下一轮开始生效
#[derive(Default)]
pub struct NoticeHub {
    listeners: RefCell<Vec<(SubscriptionId, NoticeListener)>>,
    next_id: Cell<SubscriptionId>,
}

impl NoticeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: NoticeListener) -> SubscriptionId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    pub fn emit(&self, notice: &DeckNotice) {
        let snapshot: Vec<NoticeListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(notice);
        }
    }

    /// 当前监听器数量
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}
