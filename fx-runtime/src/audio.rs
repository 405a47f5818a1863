//! # Audio 模块
//!
//! 片段音频提示：片段显示时播放元素 `data-audio-src` 指向的音频，隐藏时停止。
//!
//! 播放本身由宿主实现 [`AudioSink`]，运行时只负责在正确的时机调用。

use std::rc::Rc;

use tracing::debug;

use crate::registry::Effect;

/// 音频属性名
pub const AUDIO_SRC_ATTRIBUTE: &str = "data-audio-src";

/// 宿主音频输出
pub trait AudioSink {
    /// 播放音频（替换正在播放的音频）
    fn play(&self, src: &str);

    /// 停止播放
    fn stop(&self);
}

/// 构造音频提示效果
///
/// 目标元素缺少 `data-audio-src` 时返回 `MissingAttribute`，
/// 由 Runner 记录后继续导航。
pub fn cue_effect(sink: Rc<dyn AudioSink>) -> Effect {
    let play_sink = Rc::clone(&sink);
    Effect::new(
        move |element| {
            let src = element.require_attribute(AUDIO_SRC_ATTRIBUTE)?;
            debug!(key = %element.key(), src = %src, "播放片段音频");
            play_sink.play(&src);
            Ok(())
        },
        move |_| {
            sink.stop();
            Ok(())
        },
    )
    .labeled("audio")
}
