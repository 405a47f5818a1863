//! # Deck 模块
//!
//! 无界面 Deck：按脚本构建内存元素，模拟幻灯片导航引擎。
//!
//! ## 导航规则
//!
//! - `next()`：当前幻灯片还有未显示的片段时显示下一个（FragmentShown），
//!   否则进入下一张幻灯片（SlideChanged）
//! - `prev()`：有已显示的片段时隐藏最后一个（FragmentHidden），
//!   否则回到上一张幻灯片，其片段全部可见（与浏览器中的行为一致，不发片段通知）
//! - `goto(n)`：直接跳到第 n 张幻灯片，片段全部隐藏

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use fx_runtime::{
    ContentNode, Deck, DeckId, DeckNotice, MemoryNode, NodeSnapshot, NoticeHub, NoticeListener,
    SlideAddress, SubscriptionId,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::script::DeckScript;

/// 当前导航位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 幻灯片索引
    pub slide: usize,
    /// 已显示的片段数
    pub visible: usize,
}

struct HeadlessSlide {
    id: Option<String>,
    /// 片段对应的元素
    fragments: Vec<Rc<MemoryNode>>,
}

/// 无界面 Deck
pub struct HeadlessDeck {
    id: DeckId,
    ready: Cell<bool>,
    hub: NoticeHub,
    slides: Vec<HeadlessSlide>,
    elements: BTreeMap<String, Rc<MemoryNode>>,
    position: Cell<Position>,
}

impl HeadlessDeck {
    /// 按脚本构建（脚本需已通过验证）
    ///
    /// 构建后处于未就绪状态，调用 [`mark_ready`](Self::mark_ready) 之后才能启动 Runner。
    pub fn from_script(script: &DeckScript) -> Rc<Self> {
        let mut elements = BTreeMap::new();
        let mut slides = Vec::with_capacity(script.slides.len());

        for slide in &script.slides {
            for spec in &slide.elements {
                let node = spec
                    .attributes
                    .iter()
                    .fold(MemoryNode::new(&spec.id).with_text(&spec.text), |node, (k, v)| {
                        node.with_attribute(k, v)
                    });
                elements.insert(spec.id.clone(), Rc::new(node));
            }

            let fragments = slide
                .fragments
                .iter()
                .filter_map(|id| elements.get(id).cloned())
                .collect();
            slides.push(HeadlessSlide {
                id: slide.id.clone(),
                fragments,
            });
        }

        debug!(deck = %script.id, slides = slides.len(), elements = elements.len(), "构建 HeadlessDeck");

        Rc::new(Self {
            id: script.id.clone(),
            ready: Cell::new(false),
            hub: NoticeHub::new(),
            slides,
            elements,
            position: Cell::new(Position {
                slide: 0,
                visible: 0,
            }),
        })
    }

    /// 导航引擎初始化完成
    pub fn mark_ready(&self) {
        if !self.ready.replace(true) {
            info!(deck = %self.id, "Deck 已就绪");
        }
    }

    /// 前进一步，返回发出的通知；已在末尾时返回 None
    pub fn next(&self) -> Option<DeckNotice> {
        let Position { slide, visible } = self.position.get();
        let total = self.fragment_count(slide);

        if visible < total {
            self.position.set(Position {
                slide,
                visible: visible + 1,
            });
            return Some(self.emit(DeckNotice::fragment_shown(self.address(slide), visible)));
        }

        if slide + 1 < self.slides.len() {
            self.position.set(Position {
                slide: slide + 1,
                visible: 0,
            });
            return Some(self.emit(DeckNotice::slide_changed(self.address(slide + 1))));
        }

        None
    }

    /// 后退一步，返回发出的通知；已在开头时返回 None
    pub fn prev(&self) -> Option<DeckNotice> {
        let Position { slide, visible } = self.position.get();

        if visible > 0 {
            self.position.set(Position {
                slide,
                visible: visible - 1,
            });
            return Some(self.emit(DeckNotice::fragment_hidden(
                self.address(slide),
                visible - 1,
            )));
        }

        if slide > 0 {
            self.position.set(Position {
                slide: slide - 1,
                visible: self.fragment_count(slide - 1),
            });
            return Some(self.emit(DeckNotice::slide_changed(self.address(slide - 1))));
        }

        None
    }

    /// 跳到指定幻灯片；索引越界时返回 None
    pub fn goto(&self, slide: usize) -> Option<DeckNotice> {
        if slide >= self.slides.len() {
            return None;
        }
        self.position.set(Position { slide, visible: 0 });
        Some(self.emit(DeckNotice::slide_changed(self.address(slide))))
    }

    fn emit(&self, notice: DeckNotice) -> DeckNotice {
        debug!(kind = ?notice.kind, slide = notice.slide.index, fragment = ?notice.fragment_index, "Deck 通知");
        self.hub.emit(&notice);
        notice
    }

    /// 幻灯片寻址
    pub fn address(&self, slide: usize) -> SlideAddress {
        match self.slides.get(slide).and_then(|s| s.id.clone()) {
            Some(id) => SlideAddress::with_id(slide, id),
            None => SlideAddress::at(slide),
        }
    }

    pub fn position(&self) -> Position {
        self.position.get()
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn fragment_count(&self, slide: usize) -> usize {
        self.slides.get(slide).map_or(0, |s| s.fragments.len())
    }

    /// 按 id 查找元素
    pub fn element(&self, id: &str) -> Option<Rc<dyn ContentNode>> {
        self.elements
            .get(id)
            .map(|node| Rc::clone(node) as Rc<dyn ContentNode>)
    }

    /// 所有元素的当前状态
    pub fn snapshot(&self) -> BTreeMap<String, NodeSnapshot> {
        self.elements
            .iter()
            .map(|(id, node)| (id.clone(), node.snapshot()))
            .collect()
    }

    /// 当前订阅数
    pub fn listener_count(&self) -> usize {
        self.hub.len()
    }
}

impl Deck for HeadlessDeck {
    fn deck_id(&self) -> DeckId {
        self.id.clone()
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn subscribe(&self, listener: NoticeListener) -> SubscriptionId {
        self.hub.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }

    fn resolve_fragment(
        &self,
        slide: &SlideAddress,
        fragment_index: usize,
    ) -> Option<Rc<dyn ContentNode>> {
        let node = self.slides.get(slide.index)?.fragments.get(fragment_index)?;
        Some(Rc::clone(node) as Rc<dyn ContentNode>)
    }
}
