//! # Log 模块
//!
//! 效果执行日志，记录每一次实际调用的回调及其结果。
//!
//! ## 设计原则
//!
//! - 只记录真正发生的调用，被幂等检查吞掉的重复事件不记录
//! - 有上限，超出后丢弃最早的记录
//! - 所有数据可序列化，方便宿主导出调试

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::event::{Direction, EffectKey};

/// 单次调用结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectOutcome {
    /// 回调正常返回
    Applied,
    /// 回调返回错误
    Failed { message: String },
    /// 回调 panic
    Panicked { message: String },
}

impl EffectOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// 一条执行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    /// 效果键
    pub key: EffectKey,
    /// 方向
    pub direction: Direction,
    /// 效果标签（注册时可选提供）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 是否解析到了目标元素
    pub element_resolved: bool,
    /// 执行结果
    pub outcome: EffectOutcome,
    /// 时间戳（Unix 秒）
    pub timestamp: u64,
}

impl EffectRecord {
    pub fn new(
        key: EffectKey,
        direction: Direction,
        label: Option<String>,
        element_resolved: bool,
        outcome: EffectOutcome,
    ) -> Self {
        Self {
            key,
            direction,
            label,
            element_resolved,
            outcome,
            timestamp: current_timestamp(),
        }
    }

    /// 不含时间戳的单行摘要
    ///
    /// 形如 `show #1/0 applied`、`hide intro/2 failed: ...`
    pub fn summary(&self) -> String {
        let verb = match self.direction {
            Direction::Forward => "show",
            Direction::Backward => "hide",
        };
        let outcome = match &self.outcome {
            EffectOutcome::Applied => "applied".to_string(),
            EffectOutcome::Failed { message } => format!("failed: {}", message),
            EffectOutcome::Panicked { message } => format!("panicked: {}", message),
        };
        match &self.label {
            Some(label) => format!("{} {} [{}] {}", verb, self.key, label, outcome),
            None => format!("{} {} {}", verb, self.key, outcome),
        }
    }
}

/// 效果日志容器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectLog {
    /// 记录（按时间顺序）
    records: VecDeque<EffectRecord>,
    /// 最大记录数
    max_records: usize,
    /// 累计写入数（不受淘汰与清空影响）
    #[serde(default)]
    total: u64,
}

impl Default for EffectLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectLog {
    /// 创建新的日志
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
            max_records: 1000,
            total: 0,
        }
    }

    /// 设置最大记录数
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// 添加记录
    pub fn push(&mut self, record: EffectRecord) {
        self.records.push_back(record);
        self.total += 1;

        while self.records.len() > self.max_records {
            self.records.pop_front();
        }
    }

    /// 所有记录
    pub fn records(&self) -> impl Iterator<Item = &EffectRecord> {
        self.records.iter()
    }

    /// 累计写入的记录数，可作为 [`since`](Self::since) 的标记
    pub fn total(&self) -> u64 {
        self.total
    }

    /// 标记之后写入、且尚未被淘汰的记录
    pub fn since(&self, mark: u64) -> impl Iterator<Item = &EffectRecord> {
        let first = self.total.saturating_sub(self.records.len() as u64);
        let skip = mark.saturating_sub(first) as usize;
        self.records.iter().skip(skip)
    }

    /// 最近一条记录
    pub fn last(&self) -> Option<&EffectRecord> {
        self.records.back()
    }

    /// 失败（含 panic）的记录数
    pub fn failure_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.outcome.is_applied())
            .count()
    }

    /// 所有记录的摘要
    pub fn summaries(&self) -> Vec<String> {
        self.records.iter().map(EffectRecord::summary).collect()
    }

    /// 清空日志
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 获取当前时间戳（Unix 秒）
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SlideKey;

    fn applied(slide: &str, fragment: usize, direction: Direction) -> EffectRecord {
        EffectRecord::new(
            EffectKey::new(slide, fragment),
            direction,
            None,
            true,
            EffectOutcome::Applied,
        )
    }

    #[test]
    fn test_log_basic() {
        let mut log = EffectLog::new();
        assert!(log.is_empty());

        log.push(applied("s1", 0, Direction::Forward));
        log.push(EffectRecord::new(
            EffectKey::new("s1", 1),
            Direction::Forward,
            Some("边框".to_string()),
            false,
            EffectOutcome::Failed {
                message: "boom".to_string(),
            },
        ));

        assert_eq!(log.len(), 2);
        assert_eq!(log.failure_count(), 1);
        assert_eq!(
            log.summaries(),
            vec![
                "show s1/0 applied".to_string(),
                "show s1/1 [边框] failed: boom".to_string(),
            ]
        );
    }

    #[test]
    fn test_log_max_records() {
        let mut log = EffectLog::new().with_max_records(3);

        for i in 0..5 {
            log.push(applied("s1", i, Direction::Forward));
        }

        assert_eq!(log.len(), 3);
        // 应该保留最后 3 条
        assert_eq!(log.records().next().unwrap().key.fragment, 2);
        assert_eq!(log.last().unwrap().key.fragment, 4);
    }

    #[test]
    fn test_log_since_mark() {
        let mut log = EffectLog::new().with_max_records(3);
        log.push(applied("s1", 0, Direction::Forward));
        let mark = log.total();

        for i in 1..4 {
            log.push(applied("s1", i, Direction::Forward));
        }

        // 淘汰之后标记依然有效
        let fragments: Vec<_> = log.since(mark).map(|r| r.key.fragment).collect();
        assert_eq!(fragments, vec![1, 2, 3]);
        assert_eq!(log.since(log.total()).count(), 0);

        log.clear();
        assert_eq!(log.total(), 4);
        assert_eq!(log.since(mark).count(), 0);
    }

    #[test]
    fn test_log_serialization() {
        let mut log = EffectLog::new();
        log.push(applied("s1", 0, Direction::Backward));
        log.push(EffectRecord::new(
            EffectKey::new(SlideKey::Index(0), 0),
            Direction::Forward,
            None,
            true,
            EffectOutcome::Panicked {
                message: "oops".to_string(),
            },
        ));

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"status\":\"panicked\""));
        let loaded: EffectLog = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.failure_count(), 1);
    }
}
