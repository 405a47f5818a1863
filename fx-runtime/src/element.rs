//! # Element 模块
//!
//! 效果回调操作的内容元素。
//!
//! ## 设计说明
//!
//! - `ContentNode` 是宿主提供的类 DOM 节点，Runtime 只通过该 trait 访问它
//! - `ElementHandle` 只持有节点的弱引用：不创建、不销毁、不延长其生命周期
//! - 节点已被宿主销毁时，所有操作返回 `ElementNotFound`，由 Runner 记录后继续导航
//! - 所有修改操作都是同步、幂等的

use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::animation::{Animation, AnimationKind};
use crate::error::{EffectError, EffectResult};
use crate::event::EffectKey;

/// 宿主内容节点
///
/// 方法都接收 `&self`，宿主用内部可变性实现修改。
pub trait ContentNode {
    /// 读取样式属性
    fn style(&self, property: &str) -> Option<String>;
    /// 设置样式属性
    fn set_style(&self, property: &str, value: &str);
    /// 移除样式属性
    fn remove_style(&self, property: &str);

    /// 当前所有 class
    fn classes(&self) -> Vec<String>;
    /// 添加 class（已存在时不变）
    fn add_class(&self, class: &str);
    /// 移除 class（不存在时不变）
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    /// 文本内容
    fn text(&self) -> String;
    /// 替换文本内容
    fn set_text(&self, text: &str);

    /// 读取属性（如 `data-audio-src`）
    fn attribute(&self, name: &str) -> Option<String>;
}

/// 传给效果回调的元素句柄
#[derive(Clone)]
pub struct ElementHandle {
    key: EffectKey,
    node: Option<Weak<dyn ContentNode>>,
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementHandle")
            .field("key", &self.key)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl ElementHandle {
    /// 指向某个节点的句柄
    pub fn attached(key: EffectKey, node: &Rc<dyn ContentNode>) -> Self {
        Self {
            key,
            node: Some(Rc::downgrade(node)),
        }
    }

    /// 由弱引用创建（节点可能已不存在）
    pub fn from_weak(key: EffectKey, node: Weak<dyn ContentNode>) -> Self {
        Self {
            key,
            node: Some(node),
        }
    }

    /// 没有目标元素的句柄
    pub fn detached(key: EffectKey) -> Self {
        Self { key, node: None }
    }

    /// 所属效果键
    pub fn key(&self) -> &EffectKey {
        &self.key
    }

    /// 目标节点是否仍然存在
    pub fn is_attached(&self) -> bool {
        self.node.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    /// 获取目标节点
    pub fn node(&self) -> Result<Rc<dyn ContentNode>, EffectError> {
        self.node
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| EffectError::ElementNotFound {
                slide: self.key.slide.clone(),
                fragment: self.key.fragment,
            })
    }

    // ========== 样式 ==========

    pub fn style(&self, property: &str) -> Result<Option<String>, EffectError> {
        Ok(self.node()?.style(property))
    }

    pub fn set_style(&self, property: &str, value: &str) -> EffectResult {
        self.node()?.set_style(property, value);
        Ok(())
    }

    /// 批量设置样式
    pub fn set_styles(&self, styles: &[(&str, &str)]) -> EffectResult {
        let node = self.node()?;
        for (property, value) in styles {
            node.set_style(property, value);
        }
        Ok(())
    }

    /// 清除样式（恢复为宿主默认）
    pub fn clear_style(&self, property: &str) -> EffectResult {
        self.node()?.remove_style(property);
        Ok(())
    }

    pub fn clear_styles(&self, properties: &[&str]) -> EffectResult {
        let node = self.node()?;
        for property in properties {
            node.remove_style(property);
        }
        Ok(())
    }

    // ========== class ==========

    pub fn has_class(&self, class: &str) -> Result<bool, EffectError> {
        Ok(self.node()?.has_class(class))
    }

    pub fn add_class(&self, class: &str) -> EffectResult {
        self.node()?.add_class(class);
        Ok(())
    }

    pub fn remove_class(&self, class: &str) -> EffectResult {
        self.node()?.remove_class(class);
        Ok(())
    }

    /// `on` 为 true 时确保存在，否则确保不存在
    pub fn toggle_class(&self, class: &str, on: bool) -> EffectResult {
        let node = self.node()?;
        if on {
            node.add_class(class);
        } else {
            node.remove_class(class);
        }
        Ok(())
    }

    // ========== 文本与属性 ==========

    pub fn text(&self) -> Result<String, EffectError> {
        Ok(self.node()?.text())
    }

    pub fn set_text(&self, text: &str) -> EffectResult {
        self.node()?.set_text(text);
        Ok(())
    }

    pub fn attribute(&self, name: &str) -> Result<Option<String>, EffectError> {
        Ok(self.node()?.attribute(name))
    }

    /// 读取必需属性，缺失时返回 `MissingAttribute`
    pub fn require_attribute(&self, name: &str) -> Result<String, EffectError> {
        self.attribute(name)?
            .ok_or_else(|| EffectError::MissingAttribute {
                name: name.to_string(),
            })
    }

    // ========== 动画 ==========

    /// 应用动画
    ///
    /// 同种类的旧动画 class 会先被移除，保证同一元素上每种动画只有一个变体。
    pub fn animate(&self, animation: &Animation) -> EffectResult {
        let node = self.node()?;
        remove_kind(&*node, animation.kind());
        for class in animation.class_names() {
            node.add_class(&class);
        }
        Ok(())
    }

    /// 撤销某种动画
    pub fn undo_animate(&self, kind: AnimationKind) -> EffectResult {
        remove_kind(&*self.node()?, kind);
        Ok(())
    }
}

fn remove_kind(node: &dyn ContentNode, kind: AnimationKind) {
    for class in node.classes() {
        if kind.owns_class(&class) {
            node.remove_class(&class);
        }
    }
}

/// 内存中的内容节点
///
/// 供无界面宿主与测试使用。
#[derive(Debug, Default)]
pub struct MemoryNode {
    id: String,
    data: RefCell<NodeSnapshot>,
}

/// 节点当前状态的快照
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl MemoryNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: RefCell::default(),
        }
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.data.borrow_mut().text = text.into();
        self
    }

    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
        self
    }

    /// 包装为共享节点
    pub fn shared(self) -> Rc<dyn ContentNode> {
        Rc::new(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        self.data.borrow().clone()
    }
}

impl ContentNode for MemoryNode {
    fn style(&self, property: &str) -> Option<String> {
        self.data.borrow().styles.get(property).cloned()
    }

    fn set_style(&self, property: &str, value: &str) {
        self.data
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn remove_style(&self, property: &str) {
        self.data.borrow_mut().styles.remove(property);
    }

    fn classes(&self) -> Vec<String> {
        self.data.borrow().classes.iter().cloned().collect()
    }

    fn add_class(&self, class: &str) {
        self.data.borrow_mut().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.data.borrow_mut().classes.remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.data.borrow().classes.contains(class)
    }

    fn text(&self) -> String {
        self.data.borrow().text.clone()
    }

    fn set_text(&self, text: &str) {
        self.data.borrow_mut().text = text.to_string();
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }
}
