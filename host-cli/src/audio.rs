//! 不出声的音频输出：只记录播放/停止请求。

use std::cell::RefCell;

use fx_runtime::AudioSink;
use serde::Serialize;
use tracing::info;

/// 音频请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AudioEvent {
    Play { src: String },
    Stop,
}

#[derive(Debug, Default)]
pub struct LoggingAudio {
    events: RefCell<Vec<AudioEvent>>,
    current: RefCell<Option<String>>,
}

impl LoggingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// 正在播放的音频
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.borrow().clone()
    }
}

impl AudioSink for LoggingAudio {
    fn play(&self, src: &str) {
        info!(src, "播放音频");
        *self.current.borrow_mut() = Some(src.to_string());
        self.events.borrow_mut().push(AudioEvent::Play {
            src: src.to_string(),
        });
    }

    fn stop(&self) {
        if let Some(src) = self.current.borrow_mut().take() {
            info!(src = %src, "停止音频");
        }
        self.events.borrow_mut().push(AudioEvent::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_and_stop() {
        let audio = LoggingAudio::new();
        audio.play("a.mp3");
        audio.play("b.mp3");
        assert_eq!(audio.current().as_deref(), Some("b.mp3"));

        audio.stop();
        assert_eq!(audio.current(), None);
        assert_eq!(
            audio.events(),
            vec![
                AudioEvent::Play {
                    src: "a.mp3".to_string()
                },
                AudioEvent::Play {
                    src: "b.mp3".to_string()
                },
                AudioEvent::Stop,
            ]
        );
    }
}
