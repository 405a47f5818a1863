//! # Observer 模块
//!
//! 把 Deck 的原始通知翻译为 [`NavigationEvent`]。
//!
//! ## 设计说明
//!
//! - 每个 Deck 实例只订阅一次：对同一 Deck 实例重复 attach 是空操作，
//!   attach 到另一个实例时先取消旧订阅，保证事件不会重复触发
//! - 实例按 `Rc` 地址识别；`deck_id` 只用于日志，重新初始化的 Deck 即使沿用旧 id 也会被替换
//! - 只做寻址转换（shown → Forward，hidden → Backward），不查询注册表，
//!   没有注册效果的片段同样转发
//! - 不带片段索引的通知（幻灯片切换）不产生事件

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::deck::{Deck, DeckId, DeckNotice, NoticeKind, SubscriptionId};
use crate::event::NavigationEvent;

/// 事件接收者
pub type EventSink = Rc<dyn Fn(&NavigationEvent)>;

/// attach 结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// 新建订阅
    Attached,
    /// 已订阅该 Deck，未做任何改变
    AlreadyAttached,
    /// 取消了旧 Deck 的订阅后订阅新 Deck
    Replaced { previous: DeckId },
}

struct Attachment {
    deck: Rc<dyn Deck>,
    deck_id: DeckId,
    subscription: SubscriptionId,
}

/// 导航观察者
#[derive(Default)]
pub struct NavigationObserver {
    attachment: Option<Attachment>,
}

impl fmt::Debug for NavigationObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationObserver")
            .field("deck", &self.attached_deck())
            .finish()
    }
}

impl NavigationObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原始通知 → 导航事件
    pub fn translate(notice: &DeckNotice) -> Option<NavigationEvent> {
        let fragment_index = notice.fragment_index?;
        match notice.kind {
            NoticeKind::FragmentShown => {
                Some(NavigationEvent::forward(notice.slide.clone(), fragment_index))
            }
            NoticeKind::FragmentHidden => {
                Some(NavigationEvent::backward(notice.slide.clone(), fragment_index))
            }
            NoticeKind::SlideChanged => None,
        }
    }

    /// 订阅 Deck，把翻译后的事件交给 `sink`
    pub fn attach(&mut self, deck: Rc<dyn Deck>, sink: EventSink) -> AttachOutcome {
        let deck_id = deck.deck_id();

        let previous = match self.attachment.take() {
            Some(current) if same_deck(&current.deck, &deck) => {
                self.attachment = Some(current);
                return AttachOutcome::AlreadyAttached;
            }
            Some(current) => {
                current.deck.unsubscribe(current.subscription);
                Some(current.deck_id)
            }
            None => None,
        };

        let subscription = deck.subscribe(Rc::new(move |notice: &DeckNotice| {
            match Self::translate(notice) {
                Some(event) => sink(&event),
                None => trace!(slide = notice.slide.index, kind = ?notice.kind, "忽略非片段通知"),
            }
        }));
        debug!(deck = %deck_id, subscription, "NavigationObserver 已订阅 Deck");

        self.attachment = Some(Attachment {
            deck,
            deck_id,
            subscription,
        });

        match previous {
            Some(previous) => AttachOutcome::Replaced { previous },
            None => AttachOutcome::Attached,
        }
    }

    /// 取消订阅，返回之前是否已订阅
    pub fn detach(&mut self) -> bool {
        match self.attachment.take() {
            Some(current) => {
                current.deck.unsubscribe(current.subscription);
                debug!(deck = %current.deck_id, "NavigationObserver 已取消订阅");
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// 当前订阅的 Deck
    pub fn attached_deck(&self) -> Option<&str> {
        self.attachment.as_ref().map(|a| a.deck_id.as_str())
    }

    /// 当前订阅的 Deck 句柄
    pub fn deck(&self) -> Option<&Rc<dyn Deck>> {
        self.attachment.as_ref().map(|a| &a.deck)
    }
}

/// 是否为同一个 Deck 实例
fn same_deck(a: &Rc<dyn Deck>, b: &Rc<dyn Deck>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl Drop for NavigationObserver {
    fn drop(&mut self) {
        self.detach();
    }
}
