//! # Script 模块
//!
//! Deck 脚本：用 JSON 描述幻灯片、元素、片段以及片段效果。
//!
//! ```json
//! {
//!   "id": "demo",
//!   "slides": [
//!     {
//!       "id": "proof",
//!       "elements": [
//!         { "id": "step-1", "text": "a = b" },
//!         { "id": "voice", "attributes": { "data-audio-src": "audio/proof.mp3" } }
//!       ],
//!       "fragments": ["step-1", "voice"]
//!     }
//!   ],
//!   "effects": [
//!     {
//!       "slide": "proof",
//!       "fragment": 0,
//!       "show": [{ "op": "animate", "animation": { "type": "background", "color": "yellow" } }],
//!       "hide": [{ "op": "undo_animate", "kind": "background" }]
//!     }
//!   ]
//! }
//! ```
//!
//! 效果的 `slide` 可以是数字（线性索引）或字符串（幻灯片 id）。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use fx_runtime::{Animation, AnimationKind, SlideKey};

use crate::error::ScriptError;

/// Deck 脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckScript {
    /// Deck 标识
    #[serde(default = "default_deck_id")]
    pub id: String,

    /// 幻灯片（按线性顺序）
    pub slides: Vec<SlideSpec>,

    /// 片段效果
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

fn default_deck_id() -> String {
    "deck".to_string()
}

/// 一张幻灯片
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// 幻灯片上的元素
    #[serde(default)]
    pub elements: Vec<ElementSpec>,

    /// 片段（按显示顺序），每个片段对应一个元素 id
    #[serde(default)]
    pub fragments: Vec<String>,
}

/// 内容元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// 一个片段效果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    /// 幻灯片（索引或 id）
    pub slide: SlideKey,

    /// 片段索引
    pub fragment: usize,

    /// 显式目标元素；缺省时使用片段自身的元素
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// 诊断标签
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub show: Vec<EffectOp>,

    #[serde(default)]
    pub hide: Vec<EffectOp>,
}

/// 效果中的单个操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EffectOp {
    SetStyle { property: String, value: String },
    ClearStyle { property: String },
    AddClass { class: String },
    RemoveClass { class: String },
    SetText { text: String },
    Animate { animation: Animation },
    UndoAnimate { kind: AnimationKind },
    /// 播放音频；`src` 缺省时读取元素的 `data-audio-src`
    PlayAudio {
        #[serde(default)]
        src: Option<String>,
    },
    StopAudio,
}

impl DeckScript {
    /// 从 JSON 文本解析并验证
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// 加载脚本文件
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 按键查找幻灯片索引
    pub fn slide_index(&self, key: &SlideKey) -> Option<usize> {
        match key {
            SlideKey::Index(index) => (*index < self.slides.len()).then_some(*index),
            SlideKey::Id(id) => self
                .slides
                .iter()
                .position(|slide| slide.id.as_deref() == Some(id.as_str())),
        }
    }

    /// 验证引用关系
    ///
    /// - 幻灯片 id 与元素 id 全局唯一
    /// - 片段引用同一幻灯片上的元素
    /// - 效果引用存在的幻灯片、片段与元素
    pub fn validate(&self) -> Result<(), ScriptError> {
        let mut slide_ids = HashSet::new();
        let mut element_ids = HashSet::new();

        for slide in &self.slides {
            if let Some(id) = &slide.id
                && !slide_ids.insert(id.as_str())
            {
                return Err(ScriptError::Duplicate {
                    what: "幻灯片",
                    name: id.clone(),
                });
            }

            for element in &slide.elements {
                if !element_ids.insert(element.id.as_str()) {
                    return Err(ScriptError::Duplicate {
                        what: "元素",
                        name: element.id.clone(),
                    });
                }
            }

            for fragment in &slide.fragments {
                if !slide.elements.iter().any(|e| &e.id == fragment) {
                    return Err(ScriptError::UnknownElement {
                        element: fragment.clone(),
                    });
                }
            }
        }

        for effect in &self.effects {
            let index =
                self.slide_index(&effect.slide)
                    .ok_or_else(|| ScriptError::UnknownSlide {
                        slide: effect.slide.to_string(),
                    })?;

            let count = self.slides[index].fragments.len();
            if effect.fragment >= count {
                return Err(ScriptError::FragmentOutOfRange {
                    slide: effect.slide.to_string(),
                    fragment: effect.fragment,
                    count,
                });
            }

            if let Some(target) = &effect.target
                && !element_ids.contains(target.as_str())
            {
                return Err(ScriptError::UnknownElement {
                    element: target.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = r#"{
        "id": "demo",
        "slides": [
            { "elements": [{ "id": "title", "text": "标题" }] },
            {
                "id": "proof",
                "elements": [
                    { "id": "step-1", "text": "a = b" },
                    { "id": "step-2", "text": "b = c" }
                ],
                "fragments": ["step-1", "step-2"]
            }
        ],
        "effects": [
            {
                "slide": "proof",
                "fragment": 0,
                "show": [{ "op": "animate", "animation": { "type": "background", "color": "yellow" } }],
                "hide": [{ "op": "undo_animate", "kind": "background" }]
            },
            {
                "slide": 1,
                "fragment": 1,
                "target": "title",
                "show": [{ "op": "set_text", "text": "证毕" }, { "op": "play_audio" }],
                "hide": [{ "op": "stop_audio" }]
            }
        ]
    }"#;

    #[test]
    fn test_parse_deck() {
        let script = DeckScript::from_json(DECK).unwrap();
        assert_eq!(script.id, "demo");
        assert_eq!(script.slides.len(), 2);
        assert_eq!(script.effects[0].slide, SlideKey::id("proof"));
        assert_eq!(script.effects[1].slide, SlideKey::Index(1));
        assert_eq!(
            script.effects[0].show,
            vec![EffectOp::Animate {
                animation: Animation::Background {
                    color: "yellow".to_string()
                }
            }]
        );
        assert_eq!(
            script.effects[1].show[1],
            EffectOp::PlayAudio { src: None }
        );
        assert_eq!(script.effects[1].hide, vec![EffectOp::StopAudio]);
    }

    #[test]
    fn test_slide_index() {
        let script = DeckScript::from_json(DECK).unwrap();
        assert_eq!(script.slide_index(&SlideKey::id("proof")), Some(1));
        assert_eq!(script.slide_index(&SlideKey::Index(0)), Some(0));
        assert_eq!(script.slide_index(&SlideKey::Index(2)), None);
        assert_eq!(script.slide_index(&SlideKey::id("missing")), None);
    }

    #[test]
    fn test_invalid_references() {
        let unknown_slide = r#"{ "slides": [], "effects": [{ "slide": "x", "fragment": 0 }] }"#;
        assert!(matches!(
            DeckScript::from_json(unknown_slide),
            Err(ScriptError::UnknownSlide { .. })
        ));

        let out_of_range = r#"{
            "slides": [{ "elements": [{ "id": "a" }], "fragments": ["a"] }],
            "effects": [{ "slide": 0, "fragment": 1 }]
        }"#;
        assert!(matches!(
            DeckScript::from_json(out_of_range),
            Err(ScriptError::FragmentOutOfRange { count: 1, .. })
        ));

        let unknown_fragment = r#"{ "slides": [{ "fragments": ["ghost"] }] }"#;
        assert!(matches!(
            DeckScript::from_json(unknown_fragment),
            Err(ScriptError::UnknownElement { .. })
        ));

        let duplicate = r#"{
            "slides": [
                { "elements": [{ "id": "a" }] },
                { "elements": [{ "id": "a" }] }
            ]
        }"#;
        assert!(matches!(
            DeckScript::from_json(duplicate),
            Err(ScriptError::Duplicate { what: "元素", .. })
        ));

        let duplicate_slide = r#"{ "slides": [{ "id": "s" }, { "id": "s" }] }"#;
        assert!(matches!(
            DeckScript::from_json(duplicate_slide),
            Err(ScriptError::Duplicate { what: "幻灯片", .. })
        ));

        let unknown_target = r#"{
            "slides": [{ "elements": [{ "id": "a" }], "fragments": ["a"] }],
            "effects": [{ "slide": 0, "fragment": 0, "target": "ghost" }]
        }"#;
        assert!(matches!(
            DeckScript::from_json(unknown_target),
            Err(ScriptError::UnknownElement { element }) if element == "ghost"
        ));
    }
}
