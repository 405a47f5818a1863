//! # Engine 模块
//!
//! FragmentRunner：片段效果调度引擎。
//!
//! ## 执行模型
//!
//! ```text
//! dispatch(event) -> Dispatch
//! ```
//!
//! 1. 在注册表中按候选键查找绑定，找不到则什么也不做
//! 2. 检查显示状态：Forward 要求 "未显示"，Backward 要求 "已显示"，否则忽略
//! 3. 解析目标元素（显式绑定优先，其次由 Deck 解析）
//! 4. 调用回调并捕获失败，随后翻转显示状态、写入效果日志
//!
//! 回调执行期间再次到达的事件（例如回调触发了导航）会进入队列，
//! 在当前回调返回后按到达顺序处理，任何时刻最多只有一个回调在执行。
//! 单次分发连带处理的重入事件数受 `max_queued_events` 约束；
//! 回调 panic 向外传播时，队列中尚未处理的事件被丢弃。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, trace, warn};

use crate::config::RunnerConfig;
use crate::deck::Deck;
use crate::element::{ContentNode, ElementHandle};
use crate::error::RunnerError;
use crate::event::{Direction, EffectKey, NavigationEvent, SlideKey};
use crate::log::{EffectLog, EffectOutcome, EffectRecord};
use crate::observer::{AttachOutcome, EventSink, NavigationObserver};
use crate::registry::{EffectBinding, EffectRegistry};
use crate::runner::invoke::invoke;
use crate::state::RunnerState;

/// `start` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// 首次启动
    Started,
    /// 已在该 Deck 上启动，本次调用为空操作
    AlreadyStarted,
    /// 切换到了另一个 Deck，显示状态已重置
    Restarted,
}

/// 单个事件的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// 调用了回调
    Invoked {
        key: EffectKey,
        outcome: EffectOutcome,
    },
    /// Forward 事件，但效果已处于显示状态
    AlreadyApplied { key: EffectKey },
    /// Backward 事件，但效果未处于显示状态
    NotShown { key: EffectKey },
    /// 该片段没有注册效果
    Unregistered,
    /// 回调执行中到达，已排队
    Queued,
    /// 队列已满，事件被丢弃
    Dropped,
    /// Runner 尚未启动
    NotStarted,
}

impl Dispatch {
    /// 是否调用了回调
    pub fn is_invoked(&self) -> bool {
        matches!(self, Self::Invoked { .. })
    }
}

struct RunnerInner {
    registry: EffectRegistry,
    config: RunnerConfig,
    state: RefCell<RunnerState>,
    log: RefCell<EffectLog>,
    observer: RefCell<NavigationObserver>,
    deck: RefCell<Option<Rc<dyn Deck>>>,
    dispatching: Cell<bool>,
    queue: RefCell<VecDeque<NavigationEvent>>,
}

/// 片段效果调度器
///
/// 可廉价克隆的句柄。一个演示文稿对应一个 Runner 和一个注册表，
/// 多个演示文稿之间互不影响。
///
/// # 使用示例
///
/// ```ignore
/// let registry = EffectRegistry::new();
/// registry.register("intro", 0, Effect::new(
///     |el| el.animate(&Animation::Accepted),
///     |el| el.undo_animate(AnimationKind::Accepted),
/// ));
///
/// let runner = FragmentRunner::new(registry);
/// // Deck 就绪后启动
/// runner.start(deck)?;
/// ```
#[derive(Clone)]
pub struct FragmentRunner {
    inner: Rc<RunnerInner>,
}

impl fmt::Debug for FragmentRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentRunner")
            .field("started", &self.is_started())
            .field("registry", &self.inner.registry)
            .field("state", &self.inner.state.borrow())
            .finish()
    }
}

/// 分发期间置位，离开作用域（包括 panic 展开）时复位并清空重入队列
struct DispatchGuard<'a>(&'a RunnerInner);

impl<'a> DispatchGuard<'a> {
    fn enter(inner: &'a RunnerInner) -> Self {
        inner.dispatching.set(true);
        Self(inner)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.dispatching.set(false);
        let mut queue = self.0.queue.borrow_mut();
        if !queue.is_empty() {
            warn!(discarded = queue.len(), "分发中断，丢弃未处理的重入事件");
            queue.clear();
        }
    }
}

/// 解析得到的目标元素
///
/// 在回调执行期间持有节点的强引用，防止 Deck 返回的临时节点提前释放。
struct ResolvedElement {
    handle: ElementHandle,
    _keep_alive: Option<Rc<dyn ContentNode>>,
}

impl FragmentRunner {
    /// 使用默认配置创建
    pub fn new(registry: EffectRegistry) -> Self {
        Self::with_config(registry, RunnerConfig::default())
    }

    /// 使用指定配置创建
    pub fn with_config(registry: EffectRegistry, config: RunnerConfig) -> Self {
        let log = EffectLog::new().with_max_records(config.log_capacity);
        Self {
            inner: Rc::new(RunnerInner {
                registry,
                config,
                state: RefCell::new(RunnerState::new()),
                log: RefCell::new(log),
                observer: RefCell::new(NavigationObserver::new()),
                deck: RefCell::new(None),
                dispatching: Cell::new(false),
                queue: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// 在 Deck 就绪后启动
    ///
    /// - Deck 未就绪：返回 `DeckNotReady`，不做任何改变，稍后可重试
    /// - 同一 Deck 重复启动：空操作
    /// - 换到另一个 Deck：取消旧订阅并重置显示状态
    pub fn start(&self, deck: Rc<dyn Deck>) -> Result<StartOutcome, RunnerError> {
        if !deck.is_ready() {
            warn!(deck = %deck.deck_id(), "Deck 尚未就绪，拒绝启动 FragmentRunner");
            return Err(RunnerError::DeckNotReady {
                deck: deck.deck_id(),
            });
        }

        let weak: Weak<RunnerInner> = Rc::downgrade(&self.inner);
        let sink: EventSink = Rc::new(move |event: &NavigationEvent| {
            if let Some(inner) = weak.upgrade() {
                FragmentRunner { inner }.dispatch(event);
            }
        });

        let outcome = self
            .inner
            .observer
            .borrow_mut()
            .attach(Rc::clone(&deck), sink);

        match outcome {
            AttachOutcome::AlreadyAttached => {
                debug!(deck = %deck.deck_id(), "FragmentRunner 已启动，忽略重复启动");
                Ok(StartOutcome::AlreadyStarted)
            }
            AttachOutcome::Attached => {
                info!(deck = %deck.deck_id(), effects = self.inner.registry.len(), "FragmentRunner 已启动");
                *self.inner.deck.borrow_mut() = Some(deck);
                Ok(StartOutcome::Started)
            }
            AttachOutcome::Replaced { previous } => {
                info!(previous = %previous, deck = %deck.deck_id(), "FragmentRunner 切换 Deck");
                self.inner.state.borrow_mut().clear();
                self.inner.queue.borrow_mut().clear();
                *self.inner.deck.borrow_mut() = Some(deck);
                Ok(StartOutcome::Restarted)
            }
        }
    }

    /// 停止：取消订阅并重置显示状态，保留注册表
    pub fn stop(&self) {
        if self.inner.observer.borrow_mut().detach() {
            info!("FragmentRunner 已停止");
        }
        *self.inner.deck.borrow_mut() = None;
        self.inner.state.borrow_mut().clear();
        self.inner.queue.borrow_mut().clear();
    }

    /// 拆除：停止并清空注册表与效果日志
    pub fn teardown(&self) {
        self.stop();
        self.inner.registry.clear();
        self.inner.log.borrow_mut().clear();
    }

    /// 处理一个导航事件
    ///
    /// 从不返回错误：回调失败只会记录日志。
    pub fn dispatch(&self, event: &NavigationEvent) -> Dispatch {
        if self.inner.deck.borrow().is_none() {
            debug!(
                slide = %event.slide_key(),
                fragment = event.fragment_index,
                "FragmentRunner 未启动，忽略事件"
            );
            return Dispatch::NotStarted;
        }

        if self.inner.dispatching.get() {
            let mut queue = self.inner.queue.borrow_mut();
            if queue.len() >= self.inner.config.max_queued_events {
                warn!(
                    slide = %event.slide_key(),
                    fragment = event.fragment_index,
                    limit = self.inner.config.max_queued_events,
                    "重入事件过多，丢弃"
                );
                return Dispatch::Dropped;
            }
            queue.push_back(event.clone());
            return Dispatch::Queued;
        }

        let _guard = DispatchGuard::enter(&self.inner);
        let result = self.process(event);

        // 回调与导航互相触发时，单次分发最多处理 max_queued_events 个重入事件
        let limit = self.inner.config.max_queued_events;
        let mut replayed = 0;
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(queued) = next else {
                break;
            };
            if replayed >= limit {
                let discarded = {
                    let mut queue = self.inner.queue.borrow_mut();
                    let discarded = queue.len() + 1;
                    queue.clear();
                    discarded
                };
                warn!(
                    slide = %event.slide_key(),
                    fragment = event.fragment_index,
                    limit,
                    discarded,
                    "重入事件链超出上限，停止处理"
                );
                break;
            }
            self.process(&queued);
            replayed += 1;
        }

        result
    }

    fn process(&self, event: &NavigationEvent) -> Dispatch {
        let Some(binding) = self.inner.registry.resolve(event) else {
            trace!(
                slide = %event.slide_key(),
                fragment = event.fragment_index,
                "片段没有注册效果"
            );
            return Dispatch::Unregistered;
        };
        let key = binding.key().clone();

        let shown = self.inner.state.borrow().is_shown(&key);
        match (event.direction, shown) {
            (Direction::Forward, true) => {
                debug!(key = %key, "效果已显示，忽略重复的 Forward 事件");
                return Dispatch::AlreadyApplied { key };
            }
            (Direction::Backward, false) => {
                debug!(key = %key, "效果未显示，忽略 Backward 事件");
                return Dispatch::NotShown { key };
            }
            _ => {}
        }

        let element = self.resolve_element(&binding, event);
        let element_resolved = element.handle.is_attached();

        let outcome = invoke(
            &binding,
            event.direction,
            &element.handle,
            self.inner.config.catch_panics,
        );

        {
            let mut state = self.inner.state.borrow_mut();
            match event.direction {
                Direction::Forward => state.mark_shown(key.clone()),
                Direction::Backward => state.mark_hidden(&key),
            };
        }

        self.inner.log.borrow_mut().push(EffectRecord::new(
            key.clone(),
            event.direction,
            binding.label().map(str::to_string),
            element_resolved,
            outcome.clone(),
        ));

        Dispatch::Invoked { key, outcome }
    }

    fn resolve_element(&self, binding: &EffectBinding, event: &NavigationEvent) -> ResolvedElement {
        let key = binding.key().clone();

        if let Some(bound) = binding.bound_element() {
            let handle = ElementHandle::from_weak(key, bound.clone());
            if !handle.is_attached() {
                warn!(key = %handle.key(), "绑定的元素已被销毁");
            }
            return ResolvedElement {
                handle,
                _keep_alive: None,
            };
        }

        let deck = self.inner.deck.borrow().clone();
        match deck.and_then(|deck| deck.resolve_fragment(&event.slide, event.fragment_index)) {
            Some(node) => ResolvedElement {
                handle: ElementHandle::attached(key, &node),
                _keep_alive: Some(node),
            },
            None => {
                warn!(key = %key, "无法解析片段对应的元素");
                ResolvedElement {
                    handle: ElementHandle::detached(key),
                    _keep_alive: None,
                }
            }
        }
    }

    /// 是否已启动
    pub fn is_started(&self) -> bool {
        self.inner.deck.borrow().is_some()
    }

    /// 当前订阅的 Deck
    pub fn deck_id(&self) -> Option<String> {
        self.inner
            .observer
            .borrow()
            .attached_deck()
            .map(str::to_string)
    }

    /// 效果是否处于显示状态
    pub fn is_shown(&self, slide: &SlideKey, fragment_index: usize) -> bool {
        let key = EffectKey::new(slide.clone(), fragment_index);
        self.inner.state.borrow().is_shown(&key)
    }

    /// 注册表句柄
    pub fn registry(&self) -> &EffectRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.inner.config
    }

    /// 显示状态快照
    pub fn state_snapshot(&self) -> RunnerState {
        self.inner.state.borrow().clone()
    }

    /// 效果日志快照
    pub fn log_snapshot(&self) -> EffectLog {
        self.inner.log.borrow().clone()
    }

    /// 效果日志摘要
    pub fn log_summaries(&self) -> Vec<String> {
        self.inner.log.borrow().summaries()
    }
}
