//! # Registry 模块
//!
//! 效果注册表：(幻灯片, 片段索引) → 一对 show/hide 回调。
//!
//! ## 设计说明
//!
//! - 每个效果键最多一个绑定，重复注册后者覆盖前者（不合并）
//! - 注册不依赖 Deck 或 Runner 是否已启动，目标片段的解析推迟到执行时
//! - `EffectRegistry` 是可廉价克隆的句柄，一个演示文稿一个实例，不存在全局表
//! - 查询返回绑定的 `Rc` 快照且不持有内部借用，回调中再次注册是安全的

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::element::{ContentNode, ElementHandle};
use crate::error::EffectResult;
use crate::event::{EffectKey, NavigationEvent, SlideKey};

/// 效果回调
pub type EffectFn = dyn Fn(&ElementHandle) -> EffectResult;

/// 一对 show/hide 回调及其可选目标元素
#[derive(Clone)]
pub struct Effect {
    on_show: Rc<EffectFn>,
    on_hide: Rc<EffectFn>,
    bound_element: Option<Weak<dyn ContentNode>>,
    label: Option<String>,
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("label", &self.label)
            .field("bound", &self.bound_element.is_some())
            .finish_non_exhaustive()
    }
}

impl Effect {
    /// 创建效果
    pub fn new(
        on_show: impl Fn(&ElementHandle) -> EffectResult + 'static,
        on_hide: impl Fn(&ElementHandle) -> EffectResult + 'static,
    ) -> Self {
        Self {
            on_show: Rc::new(on_show),
            on_hide: Rc::new(on_hide),
            bound_element: None,
            label: None,
        }
    }

    /// 只有 show 的效果（hide 为空操作）
    pub fn on_show(on_show: impl Fn(&ElementHandle) -> EffectResult + 'static) -> Self {
        Self::new(on_show, |_| Ok(()))
    }

    /// 绑定目标元素
    ///
    /// 只保存弱引用；元素被宿主销毁后，执行时按 "找不到元素" 处理。
    pub fn bound_to(mut self, node: &Rc<dyn ContentNode>) -> Self {
        self.bound_element = Some(Rc::downgrade(node));
        self
    }

    /// 诊断用标签
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// 注册表中的一条绑定
#[derive(Debug)]
pub struct EffectBinding {
    key: EffectKey,
    effect: Effect,
}

impl EffectBinding {
    pub fn key(&self) -> &EffectKey {
        &self.key
    }

    pub fn label(&self) -> Option<&str> {
        self.effect.label.as_deref()
    }

    /// 显式绑定的元素（可能已失效）
    pub fn bound_element(&self) -> Option<&Weak<dyn ContentNode>> {
        self.effect.bound_element.as_ref()
    }

    /// 调用 show 回调
    pub fn show(&self, element: &ElementHandle) -> EffectResult {
        (self.effect.on_show)(element)
    }

    /// 调用 hide 回调
    pub fn hide(&self, element: &ElementHandle) -> EffectResult {
        (self.effect.on_hide)(element)
    }
}

/// 效果注册表
#[derive(Clone, Default)]
pub struct EffectRegistry {
    bindings: Rc<RefCell<HashMap<EffectKey, Rc<EffectBinding>>>>,
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl EffectRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册效果
    ///
    /// 同一键已有绑定时覆盖，返回是否发生了覆盖。
    pub fn register(
        &self,
        slide: impl Into<SlideKey>,
        fragment_index: usize,
        effect: Effect,
    ) -> bool {
        let key = EffectKey::new(slide, fragment_index);
        let binding = Rc::new(EffectBinding {
            key: key.clone(),
            effect,
        });
        let replaced = self.bindings.borrow_mut().insert(key.clone(), binding).is_some();
        debug!(key = %key, replaced, "注册片段效果");
        replaced
    }

    /// 查询绑定（不存在是正常情况）
    pub fn lookup(&self, slide: &SlideKey, fragment_index: usize) -> Option<Rc<EffectBinding>> {
        let key = EffectKey::new(slide.clone(), fragment_index);
        self.bindings.borrow().get(&key).cloned()
    }

    /// 按事件的候选键依次查询，返回第一个命中的绑定
    pub fn resolve(&self, event: &NavigationEvent) -> Option<Rc<EffectBinding>> {
        let bindings = self.bindings.borrow();
        event
            .candidate_keys()
            .find_map(|key| bindings.get(&key).cloned())
    }

    /// 移除绑定，返回是否存在
    pub fn unregister(&self, slide: &SlideKey, fragment_index: usize) -> bool {
        let key = EffectKey::new(slide.clone(), fragment_index);
        self.bindings.borrow_mut().remove(&key).is_some()
    }

    /// 清空所有绑定
    pub fn clear(&self) {
        self.bindings.borrow_mut().clear();
    }

    /// 所有已注册的键（有序）
    pub fn keys(&self) -> Vec<EffectKey> {
        let mut keys: Vec<_> = self.bindings.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// 两个句柄是否指向同一张表
    pub fn same_registry(&self, other: &EffectRegistry) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
    }
}
