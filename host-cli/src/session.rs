//! # Session 模块
//!
//! 一次无界面演示：Deck + 注册表 + FragmentRunner + 音频输出。
//!
//! ```text
//! Step ──► HeadlessDeck ──DeckNotice──► FragmentRunner ──► MemoryNode
//!                                             │
//!                                             └──► LoggingAudio
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use fx_runtime::{
    DeckNotice, EffectLog, EffectRecord, EffectRegistry, FragmentRunner, NodeSnapshot,
    RunnerConfig,
};
use serde::Serialize;
use tracing::info;

use crate::audio::{AudioEvent, LoggingAudio};
use crate::deck::{HeadlessDeck, Position};
use crate::effects::install_effects;
use crate::error::HostError;
use crate::script::DeckScript;

/// 导航步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "slide", rename_all = "snake_case")]
pub enum Step {
    Next,
    Prev,
    Goto(usize),
}

impl FromStr for Step {
    type Err = String;

    /// `next` / `prev` / `goto:N`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "next" | "n" => Ok(Self::Next),
            "prev" | "p" => Ok(Self::Prev),
            other => other
                .strip_prefix("goto:")
                .and_then(|n| n.parse().ok())
                .map(Self::Goto)
                .ok_or_else(|| format!("无法识别的步骤: '{}'（可用: next, prev, goto:N）", other)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Prev => f.write_str("prev"),
            Self::Goto(slide) => write!(f, "goto:{}", slide),
        }
    }
}

/// 单步执行结果
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    /// Deck 发出的通知（已到边界时为 None）
    pub notice: Option<DeckNotice>,
    /// 本步调用的效果
    pub effects: Vec<EffectRecord>,
    /// 执行后的位置
    pub position: Position,
}

impl StepReport {
    /// 单行摘要
    pub fn summary(&self) -> String {
        let notice = match &self.notice {
            Some(notice) => match notice.fragment_index {
                Some(fragment) => format!(
                    "{:?} {}/{}",
                    notice.kind,
                    notice.slide.primary_key(),
                    fragment
                ),
                None => format!("{:?} {}", notice.kind, notice.slide.primary_key()),
            },
            None => "(boundary)".to_string(),
        };
        let effects: Vec<String> = self.effects.iter().map(EffectRecord::summary).collect();
        if effects.is_empty() {
            format!("{} -> {}", self.step, notice)
        } else {
            format!("{} -> {} | {}", self.step, notice, effects.join("; "))
        }
    }
}

/// 演示结束时的状态
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub position: Position,
    pub elements: BTreeMap<String, NodeSnapshot>,
    pub audio: Vec<AudioEvent>,
}

/// 无界面演示会话
pub struct Session {
    deck: Rc<HeadlessDeck>,
    runner: FragmentRunner,
    audio: Rc<LoggingAudio>,
}

impl Session {
    /// 构建 Deck、注册效果并启动 Runner
    pub fn new(script: &DeckScript, config: RunnerConfig) -> Result<Self, HostError> {
        let deck = HeadlessDeck::from_script(script);
        let registry = EffectRegistry::new();
        let audio = Rc::new(LoggingAudio::new());

        let count = install_effects(script, &deck, &registry, audio.clone())?;
        info!(deck = %script.id, effects = count, "效果已注册");

        let runner = FragmentRunner::with_config(registry, config);
        deck.mark_ready();
        let outcome = runner.start(deck.clone())?;
        info!(?outcome, "FragmentRunner 启动完成");

        Ok(Self {
            deck,
            runner,
            audio,
        })
    }

    /// 执行一步
    pub fn step(&self, step: Step) -> StepReport {
        let mark = self.runner.log_snapshot().total();

        let notice = match step {
            Step::Next => self.deck.next(),
            Step::Prev => self.deck.prev(),
            Step::Goto(slide) => self.deck.goto(slide),
        };

        let effects = self.runner.log_snapshot().since(mark).cloned().collect();
        StepReport {
            step,
            notice,
            effects,
            position: self.deck.position(),
        }
    }

    /// 依次执行多步
    pub fn run(&self, steps: &[Step]) -> Vec<StepReport> {
        steps.iter().map(|step| self.step(*step)).collect()
    }

    /// 一直前进到最后
    pub fn run_to_end(&self) -> Vec<StepReport> {
        let mut reports = Vec::new();
        loop {
            let report = self.step(Step::Next);
            if report.notice.is_none() {
                break;
            }
            reports.push(report);
        }
        reports
    }

    pub fn deck(&self) -> &Rc<HeadlessDeck> {
        &self.deck
    }

    pub fn runner(&self) -> &FragmentRunner {
        &self.runner
    }

    pub fn audio(&self) -> &LoggingAudio {
        &self.audio
    }

    pub fn log(&self) -> EffectLog {
        self.runner.log_snapshot()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            position: self.deck.position(),
            elements: self.deck.snapshot(),
            audio: self.audio.events(),
        }
    }
}
