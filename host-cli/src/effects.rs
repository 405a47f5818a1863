//! # Effects 模块
//!
//! 把脚本中的效果描述转换为注册表中的 [`Effect`]。
//!
//! ## 设计说明
//!
//! - 每个 [`EffectOp`] 直接映射到一个 [`ElementHandle`] 操作，按顺序执行，遇错即停
//! - 有 `target` 的效果绑定到该元素，否则由 Deck 在执行时解析片段元素
//! - 带 `data-audio-src` 属性、且脚本未声明效果的片段，自动注册音频提示

use std::collections::HashSet;
use std::rc::Rc;

use fx_runtime::{
    AUDIO_SRC_ATTRIBUTE, AudioSink, Effect, EffectRegistry, EffectResult, ElementHandle, cue_effect,
};
use tracing::debug;

use crate::deck::HeadlessDeck;
use crate::error::ScriptError;
use crate::script::{DeckScript, EffectOp, EffectSpec};

/// 注册脚本中的所有效果，返回注册数量
pub fn install_effects(
    script: &DeckScript,
    deck: &HeadlessDeck,
    registry: &EffectRegistry,
    audio: Rc<dyn AudioSink>,
) -> Result<usize, ScriptError> {
    let mut declared = HashSet::new();

    for spec in &script.effects {
        let index = script
            .slide_index(&spec.slide)
            .ok_or_else(|| ScriptError::UnknownSlide {
                slide: spec.slide.to_string(),
            })?;
        declared.insert((index, spec.fragment));

        let effect = build_effect(spec, deck, Rc::clone(&audio))?;
        registry.register(spec.slide.clone(), spec.fragment, effect);
    }

    let mut cues = 0;
    for (index, slide) in script.slides.iter().enumerate() {
        for (fragment, element_id) in slide.fragments.iter().enumerate() {
            if declared.contains(&(index, fragment)) {
                continue;
            }
            let has_audio = slide
                .elements
                .iter()
                .any(|e| &e.id == element_id && e.attributes.contains_key(AUDIO_SRC_ATTRIBUTE));
            if has_audio {
                debug!(slide = index, fragment, element = %element_id, "自动注册音频提示");
                registry.register(
                    deck.address(index).primary_key(),
                    fragment,
                    cue_effect(Rc::clone(&audio)),
                );
                cues += 1;
            }
        }
    }

    Ok(script.effects.len() + cues)
}

/// 单个效果
pub fn build_effect(
    spec: &EffectSpec,
    deck: &HeadlessDeck,
    audio: Rc<dyn AudioSink>,
) -> Result<Effect, ScriptError> {
    let show_ops = spec.show.clone();
    let hide_ops = spec.hide.clone();
    let show_audio = Rc::clone(&audio);
    let hide_audio = audio;

    let mut effect = Effect::new(
        move |element| apply_ops(&show_ops, element, &*show_audio),
        move |element| apply_ops(&hide_ops, element, &*hide_audio),
    );

    if let Some(target) = &spec.target {
        let node = deck
            .element(target)
            .ok_or_else(|| ScriptError::UnknownElement {
                element: target.clone(),
            })?;
        effect = effect.bound_to(&node);
    }
    if let Some(label) = &spec.label {
        effect = effect.labeled(label.clone());
    }

    Ok(effect)
}

/// 依次执行操作
pub fn apply_ops(ops: &[EffectOp], element: &ElementHandle, audio: &dyn AudioSink) -> EffectResult {
    for op in ops {
        match op {
            EffectOp::SetStyle { property, value } => element.set_style(property, value)?,
            EffectOp::ClearStyle { property } => element.clear_style(property)?,
            EffectOp::AddClass { class } => element.add_class(class)?,
            EffectOp::RemoveClass { class } => element.remove_class(class)?,
            EffectOp::SetText { text } => element.set_text(text)?,
            EffectOp::Animate { animation } => element.animate(animation)?,
            EffectOp::UndoAnimate { kind } => element.undo_animate(*kind)?,
            EffectOp::PlayAudio { src } => {
                let src = match src {
                    Some(src) => src.clone(),
                    None => element.require_attribute(AUDIO_SRC_ATTRIBUTE)?,
                };
                audio.play(&src);
            }
            EffectOp::StopAudio => audio.stop(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioEvent, LoggingAudio};
    use fx_runtime::{
        Animation, AnimationKind, ContentNode, EffectError, EffectKey, MemoryNode, SlideKey,
    };

    fn handle(node: &Rc<dyn ContentNode>) -> ElementHandle {
        ElementHandle::attached(EffectKey::new(SlideKey::Index(0), 0), node)
    }

    #[test]
    fn test_apply_ops() {
        let audio = LoggingAudio::new();
        let node = MemoryNode::new("cell")
            .with_attribute(AUDIO_SRC_ATTRIBUTE, "tick.mp3")
            .shared();
        let element = handle(&node);

        let ops = vec![
            EffectOp::SetStyle {
                property: "color".to_string(),
                value: "red".to_string(),
            },
            EffectOp::AddClass {
                class: "marked".to_string(),
            },
            EffectOp::Animate {
                animation: Animation::Border {
                    color: "blue".to_string(),
                    thickness: None,
                },
            },
            EffectOp::SetText {
                text: "✓".to_string(),
            },
            EffectOp::PlayAudio { src: None },
        ];
        apply_ops(&ops, &element, &audio).unwrap();

        assert_eq!(node.style("color").as_deref(), Some("red"));
        assert!(node.has_class("marked"));
        assert!(node.has_class("anim-border-blue"));
        assert_eq!(node.text(), "✓");
        assert_eq!(audio.current().as_deref(), Some("tick.mp3"));

        let undo = vec![
            EffectOp::ClearStyle {
                property: "color".to_string(),
            },
            EffectOp::RemoveClass {
                class: "marked".to_string(),
            },
            EffectOp::UndoAnimate {
                kind: AnimationKind::Border,
            },
            EffectOp::StopAudio,
        ];
        apply_ops(&undo, &element, &audio).unwrap();

        assert_eq!(node.style("color"), None);
        assert!(node.classes().is_empty());
        assert_eq!(audio.current(), None);
    }

    #[test]
    fn test_apply_ops_stops_at_first_error() {
        let audio = LoggingAudio::new();
        let node = MemoryNode::new("plain").shared();
        let element = handle(&node);

        let ops = vec![
            EffectOp::PlayAudio { src: None },
            EffectOp::SetText {
                text: "不会执行".to_string(),
            },
        ];
        let err = apply_ops(&ops, &element, &audio).unwrap_err();
        assert!(matches!(err, EffectError::MissingAttribute { .. }));
        assert_eq!(node.text(), "");
        assert!(audio.events().is_empty());

        // 显式指定音频源时不需要属性
        apply_ops(
            &[EffectOp::PlayAudio {
                src: Some("x.mp3".to_string()),
            }],
            &element,
            &audio,
        )
        .unwrap();
        assert_eq!(
            audio.events(),
            vec![AudioEvent::Play {
                src: "x.mp3".to_string()
            }]
        );
    }

    #[test]
    fn test_install_effects() {
        let script = DeckScript::from_json(
            r#"{
                "slides": [
                    {
                        "id": "intro",
                        "elements": [
                            { "id": "title" },
                            { "id": "voice", "attributes": { "data-audio-src": "intro.mp3" } },
                            { "id": "narration", "attributes": { "data-audio-src": "skip.mp3" } }
                        ],
                        "fragments": ["voice", "narration"]
                    }
                ],
                "effects": [
                    {
                        "slide": 0,
                        "fragment": 1,
                        "target": "title",
                        "label": "title",
                        "show": [{ "op": "set_text", "text": "hi" }]
                    }
                ]
            }"#,
        )
        .unwrap();
        let deck = HeadlessDeck::from_script(&script);
        let registry = EffectRegistry::new();
        let audio = Rc::new(LoggingAudio::new());

        let count = install_effects(&script, &deck, &registry, audio).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            registry.keys(),
            vec![
                EffectKey::new(SlideKey::Index(0), 1),
                EffectKey::new("intro", 0),
            ]
        );

        let binding = registry.lookup(&SlideKey::Index(0), 1).unwrap();
        assert_eq!(binding.label(), Some("title"));
        assert!(binding.bound_element().is_some());
        assert_eq!(
            registry.lookup(&SlideKey::id("intro"), 0).unwrap().label(),
            Some("audio")
        );
    }
}
