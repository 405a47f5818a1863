//! # 演示会话集成测试
//!
//! 测试 DeckScript → HeadlessDeck → FragmentRunner → MemoryNode 的完整链路。
//! 这些测试不依赖任何浏览器或渲染环境。

use fx_runtime::{Dispatch, NavigationEvent, NoticeKind, RunnerConfig, SlideKey};
use host_cli::{AudioEvent, DeckScript, Position, Session, Step};

const DEMO: &str = include_str!("../../demos/proof.json");

fn demo_session() -> Session {
    let script = DeckScript::from_json(DEMO).unwrap();
    Session::new(&script, RunnerConfig::default()).unwrap()
}

fn classes(session: &Session, element: &str) -> Vec<String> {
    session.snapshot().elements[element]
        .classes
        .iter()
        .cloned()
        .collect()
}

/// 测试一直前进到最后
#[test]
fn test_run_to_end() {
    let session = demo_session();
    let reports = session.run_to_end();

    // 2 次幻灯片切换 + 6 个片段
    assert_eq!(reports.len(), 8);
    assert_eq!(session.deck().position(), Position { slide: 2, visible: 2 });

    insta::assert_debug_snapshot!(session.runner().log_summaries(), @r#"
    [
        "show proof/0 [highlight] applied",
        "show proof/1 applied",
        "show proof/2 [verdict] applied",
        "show proof/3 [audio] applied",
        "show #2/0 applied",
        "show #2/1 failed: 元素缺少属性 'data-audio-src'",
    ]
    "#);

    // 失败的效果不影响导航，之前的操作保留
    assert_eq!(session.log().failure_count(), 1);
    assert!(classes(&session, "row-2").contains(&"mark".to_string()));
}

/// 测试效果作用到正确的元素
#[test]
fn test_effects_reach_elements() {
    let session = demo_session();
    session.run(&[Step::Next, Step::Next, Step::Next, Step::Next]);

    assert_eq!(classes(&session, "step-1"), vec!["anim-bg", "anim-bg-yellow"]);
    assert_eq!(
        classes(&session, "step-2"),
        vec!["anim-border", "anim-border-blue", "anim-border-thick"]
    );

    // 显式 target：效果作用在 claim 而不是片段自身的 verdict 上
    let snapshot = session.snapshot();
    assert_eq!(snapshot.elements["claim"].text, "a = c  (proved)");
    assert!(snapshot.elements["claim"].classes.contains("reveal-accepted"));
    assert!(snapshot.elements["verdict"].classes.is_empty());
}

/// 测试后退撤销效果
#[test]
fn test_prev_reverts_effects() {
    let session = demo_session();
    session.run(&[Step::Next, Step::Next, Step::Next, Step::Next]);
    let reports = session.run(&[Step::Prev, Step::Prev, Step::Prev]);

    assert!(
        reports
            .iter()
            .all(|r| r.notice.as_ref().map(|n| n.kind) == Some(NoticeKind::FragmentHidden))
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.elements["claim"].text, "a = c");
    assert!(snapshot.elements["claim"].classes.is_empty());
    assert!(snapshot.elements["step-1"].classes.is_empty());
    assert!(snapshot.elements["step-2"].classes.is_empty());
    assert_eq!(session.runner().state_snapshot().len(), 0);
}

/// 测试音频提示：自动注册的片段播放，隐藏时停止
#[test]
fn test_audio_cue() {
    let session = demo_session();
    session.run(&[Step::Next; 5]);
    assert_eq!(session.audio().current().as_deref(), Some("audio/proof.mp3"));

    let report = session.step(Step::Prev);
    assert_eq!(report.effects.len(), 1);
    assert_eq!(report.effects[0].label.as_deref(), Some("audio"));
    assert_eq!(
        session.audio().events(),
        vec![
            AudioEvent::Play {
                src: "audio/proof.mp3".to_string()
            },
            AudioEvent::Stop,
        ]
    );
}

/// 测试回到上一张幻灯片时不会重复触发
#[test]
fn test_return_to_previous_slide() {
    let session = demo_session();
    session.run_to_end();
    let shown_before = session.runner().state_snapshot().len();

    // 离开 table 之前先把两个片段都收回
    session.run(&[Step::Prev, Step::Prev]);
    let report = session.step(Step::Prev);
    assert_eq!(report.notice.unwrap().kind, NoticeKind::SlideChanged);
    assert!(report.effects.is_empty());
    assert_eq!(session.deck().position(), Position { slide: 1, visible: 4 });

    // proof 的四个效果仍然处于显示状态
    assert_eq!(shown_before, 6);
    assert_eq!(session.runner().state_snapshot().len(), 4);
}

/// 测试重复事件被吸收
#[test]
fn test_duplicate_event_is_absorbed() {
    let session = demo_session();
    session.run(&[Step::Next, Step::Next]);

    let event = NavigationEvent::forward(session.deck().address(1), 0);
    assert!(matches!(
        session.runner().dispatch(&event),
        Dispatch::AlreadyApplied { .. }
    ));
    assert_eq!(session.log().len(), 1);
    assert!(session.runner().is_shown(&SlideKey::id("proof"), 0));
}

/// 测试直接跳转
#[test]
fn test_goto_then_next() {
    let session = demo_session();
    let reports = session.run(&[Step::Goto(2), Step::Next, Step::Goto(9)]);

    assert_eq!(
        reports[0].notice.as_ref().unwrap().slide.primary_key(),
        SlideKey::id("table")
    );
    assert_eq!(reports[1].effects.len(), 1);
    assert!(reports[2].notice.is_none());
    assert_eq!(
        session.snapshot().elements["row-1"].styles.get("color").map(String::as_str),
        Some("green")
    );
}

/// 测试单步摘要
#[test]
fn test_step_summary() {
    let session = demo_session();
    let reports = session.run(&[Step::Next, Step::Next, Step::Prev]);

    insta::assert_debug_snapshot!(
        reports.iter().map(|r| r.summary()).collect::<Vec<_>>(),
        @r#"
    [
        "next -> SlideChanged proof",
        "next -> FragmentShown proof/0 | show proof/0 [highlight] applied",
        "prev -> FragmentHidden proof/0 | hide proof/0 [highlight] applied",
    ]
    "#
    );
}
