use promptly::caret::mapper::LogicalPosition;
use promptly::kernel::effect::SideEffect;
use promptly::kernel::event::{CaretUpdate, Event, PromptLanguage, RequestId, UserAction};
use promptly::kernel::reactor::Reactor;
use promptly::kernel::state::AnalysisPhase;
use promptly::kernel::status::{AnalysisStatus, StatusGraph, StatusRequest};
use promptly::services::llm::AnalysisResult;

fn sample_result(score: f64) -> AnalysisResult {
    AnalysisResult {
        score,
        summary: "Clear but vague".into(),
        strengths: vec!["Short".into()],
        weaknesses: vec!["No context".into(), "No format".into()],
        suggestions: vec!["Name the audience".into()],
        optimized_prompt: "Write a 4-line poem about rain for children.".into(),
    }
}

fn caret(x: f64, y: f64, text: Option<&str>, pid: Option<u32>) -> Event {
    Event::Caret(CaretUpdate {
        position: LogicalPosition {
            x,
            y,
            height: 10.0,
            text: text.map(str::to_string),
        },
        process_id: pid,
    })
}

fn act(reactor: &mut Reactor, action: UserAction) -> Vec<SideEffect> {
    reactor.step(Event::Action(action))
}

/// Drives the reactor to Loading and returns the request it issued.
fn start_analysis(reactor: &mut Reactor, text: &str) -> RequestId {
    act(reactor, UserAction::SetPromptText(text.into()));
    let effects = act(reactor, UserAction::Analyze);
    match effects.as_slice() {
        [SideEffect::RequestAnalysis { request, .. }] => *request,
        other => panic!("expected one analysis request, got {:?}", other),
    }
}

#[test]
fn test_initial_state_is_idle_and_closed() {
    let reactor = Reactor::new();
    assert_eq!(reactor.state.status(), AnalysisStatus::Idle);
    assert!(!reactor.state.sidebar_open);
    assert!(!reactor.state.manual_mode);
    assert!(reactor.state.active_process_id.is_none());
    assert!(reactor.state.latest_position.is_none());
}

#[test]
fn test_analyze_with_blank_text_is_noop() {
    let mut reactor = Reactor::new();

    assert!(act(&mut reactor, UserAction::Analyze).is_empty());
    assert_eq!(reactor.state.status(), AnalysisStatus::Idle);

    act(&mut reactor, UserAction::SetPromptText("   \n\t".into()));
    assert!(act(&mut reactor, UserAction::Analyze).is_empty());
    assert_eq!(reactor.state.status(), AnalysisStatus::Idle, "whitespace-only must stay Idle");
}

#[test]
fn test_analyze_with_text_enters_loading() {
    let mut reactor = Reactor::new();
    act(&mut reactor, UserAction::SetPromptText("write a poem".into()));

    let effects = act(&mut reactor, UserAction::Analyze);
    assert_eq!(reactor.state.status(), AnalysisStatus::Loading);
    assert_eq!(
        effects,
        vec![SideEffect::RequestAnalysis {
            request: RequestId(1),
            prompt: "write a poem".into()
        }]
    );
    assert!(!reactor.state.sidebar_open, "sidebar opens on completion, not on start");
}

#[test]
fn test_success_opens_sidebar() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "write a poem");

    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(72.0)),
    });

    assert_eq!(reactor.state.status(), AnalysisStatus::Success);
    assert!(reactor.state.sidebar_open);
    assert_eq!(reactor.state.result().map(|r| r.score), Some(72.0));
    assert!(reactor.state.pending_analysis.is_none());
}

#[test]
fn test_failure_opens_sidebar_with_message() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "write a poem");

    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Err("No response from AI".into()),
    });

    assert_eq!(reactor.state.phase(), &AnalysisPhase::Error("No response from AI".into()));
    assert!(reactor.state.sidebar_open);
}

#[test]
fn test_reanalyze_from_success_uses_same_prompt() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "summarize this");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(40.0)),
    });

    let effects = act(&mut reactor, UserAction::Reanalyze);
    assert_eq!(reactor.state.status(), AnalysisStatus::Loading);
    assert!(matches!(
        effects.as_slice(),
        [SideEffect::RequestAnalysis { prompt, .. }] if prompt == "summarize this"
    ));
}

#[test]
fn test_reanalyze_from_error_retries() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "summarize this");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Err("LLM server error: 503".into()),
    });

    let effects = act(&mut reactor, UserAction::Reanalyze);
    assert_eq!(effects.len(), 1);
    assert_eq!(reactor.state.status(), AnalysisStatus::Loading);
}

#[test]
fn test_overlapping_analyze_discards_superseded_response() {
    let mut reactor = Reactor::new();
    let first = start_analysis(&mut reactor, "first");

    act(&mut reactor, UserAction::SetPromptText("second".into()));
    let effects = act(&mut reactor, UserAction::Analyze);
    let second = match effects.as_slice() {
        [SideEffect::RequestAnalysis { request, prompt }] => {
            assert_eq!(prompt, "second");
            *request
        }
        other => panic!("unexpected effects {:?}", other),
    };
    assert_ne!(first, second);

    // Late answer for the first request is stale
    reactor.step(Event::AnalysisFinished {
        request: first,
        outcome: Ok(sample_result(10.0)),
    });
    assert_eq!(reactor.state.status(), AnalysisStatus::Loading, "stale response must not land");

    reactor.step(Event::AnalysisFinished {
        request: second,
        outcome: Ok(sample_result(90.0)),
    });
    assert_eq!(reactor.state.result().map(|r| r.score), Some(90.0));
}

#[test]
fn test_duplicate_completion_is_ignored() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Err("late".into()),
    });
    assert_eq!(reactor.state.status(), AnalysisStatus::Success);
}

#[test]
fn test_close_returns_to_idle() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });

    act(&mut reactor, UserAction::CloseSidebar);
    assert_eq!(reactor.state.status(), AnalysisStatus::Idle);
    assert!(!reactor.state.sidebar_open);
}

#[test]
fn test_close_while_loading_still_applies_response() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");

    act(&mut reactor, UserAction::CloseSidebar);
    assert_eq!(reactor.state.status(), AnalysisStatus::Idle);

    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(81.0)),
    });
    assert_eq!(reactor.state.status(), AnalysisStatus::Success, "closing does not cancel");
    assert!(reactor.state.sidebar_open);
}

#[test]
fn test_close_in_manual_mode_keeps_status() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });

    act(&mut reactor, UserAction::OpenManual);
    act(&mut reactor, UserAction::CloseSidebar);

    assert!(!reactor.state.manual_mode);
    assert!(!reactor.state.sidebar_open);
    assert_eq!(reactor.state.status(), AnalysisStatus::Success);
}

#[test]
fn test_manual_mode_scenario() {
    let mut reactor = Reactor::new();

    let effects = act(&mut reactor, UserAction::OpenManual);
    assert!(effects.is_empty(), "opening manual entry does not analyze");
    assert!(reactor.state.manual_mode);
    assert!(reactor.state.sidebar_open);
    assert_eq!(reactor.state.status(), AnalysisStatus::Idle);

    let effects = act(&mut reactor, UserAction::SubmitManual("hello".into()));
    assert_eq!(reactor.state.status(), AnalysisStatus::Loading);
    assert!(!reactor.state.manual_mode);
    assert_eq!(reactor.state.prompt_text, "hello");
    assert!(matches!(
        effects.as_slice(),
        [SideEffect::RequestAnalysis { prompt, .. }] if prompt == "hello"
    ));
}

#[test]
fn test_toggle_while_idle_with_text_analyzes() {
    let mut reactor = Reactor::new();
    act(&mut reactor, UserAction::SetPromptText("draft".into()));

    let effects = act(&mut reactor, UserAction::ToggleSidebar);
    assert_eq!(effects.len(), 1);
    assert_eq!(reactor.state.status(), AnalysisStatus::Loading);
    assert!(!reactor.state.sidebar_open);
}

#[test]
fn test_toggle_without_text_flips_sidebar() {
    let mut reactor = Reactor::new();

    assert!(act(&mut reactor, UserAction::ToggleSidebar).is_empty());
    assert!(reactor.state.sidebar_open);
    act(&mut reactor, UserAction::ToggleSidebar);
    assert!(!reactor.state.sidebar_open);
}

#[test]
fn test_toggle_after_success_flips_sidebar() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });

    assert!(act(&mut reactor, UserAction::ToggleSidebar).is_empty());
    assert!(!reactor.state.sidebar_open);
    assert_eq!(reactor.state.status(), AnalysisStatus::Success);
}

#[test]
fn test_observations_update_position_text_and_sticky_pid() {
    let mut reactor = Reactor::new();

    reactor.step(caret(10.0, 20.0, Some("first draft"), Some(100)));
    assert_eq!(reactor.state.active_process_id, Some(100));
    assert_eq!(reactor.state.prompt_text, "first draft");

    // No pid, no text: position moves, the rest stays
    reactor.step(caret(30.0, 40.0, None, None));
    assert_eq!(reactor.state.active_process_id, Some(100), "pid is sticky");
    assert_eq!(reactor.state.prompt_text, "first draft");
    let pos = reactor.state.latest_position.as_ref().expect("position");
    assert_eq!((pos.x, pos.y), (30.0, 40.0));

    // Empty text does not clear either
    reactor.step(caret(31.0, 41.0, Some(""), Some(200)));
    assert_eq!(reactor.state.active_process_id, Some(200), "newer pid overwrites");
    assert_eq!(reactor.state.prompt_text, "first draft");
}

#[test]
fn test_apply_fix_and_insert_effects() {
    let mut reactor = Reactor::new();

    assert_eq!(
        act(&mut reactor, UserAction::ApplyFix("better prompt".into())),
        vec![SideEffect::CopyToClipboard("better prompt".into())]
    );
    assert!(reactor.state.copied);
    assert!(act(&mut reactor, UserAction::ApplyFix("  ".into())).is_empty());

    // No target process yet
    assert!(act(&mut reactor, UserAction::Insert("better prompt".into())).is_empty());

    reactor.step(caret(0.0, 0.0, None, Some(77)));
    assert_eq!(
        act(&mut reactor, UserAction::Insert("better prompt".into())),
        vec![SideEffect::InsertText {
            process_id: 77,
            text: "better prompt".into()
        }]
    );
}

#[test]
fn test_quit_emits_quit_effect() {
    let mut reactor = Reactor::new();
    assert_eq!(act(&mut reactor, UserAction::Quit), vec![SideEffect::Quit]);
}

#[test]
fn test_translation_is_requested_once_and_cached() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });

    let effects = act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::English));
    let translation = match effects.as_slice() {
        [SideEffect::RequestTranslation { request, text }] => {
            assert_eq!(text, "Write a 4-line poem about rain for children.");
            *request
        }
        other => panic!("expected translation request, got {:?}", other),
    };

    // Selecting again while pending does not duplicate
    assert!(act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::English)).is_empty());

    reactor.step(Event::TranslationFinished {
        request: translation,
        outcome: Ok("translated".into()),
    });
    assert_eq!(reactor.state.translation.cached.as_deref(), Some("translated"));

    act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::Original));
    assert!(
        act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::English)).is_empty(),
        "cached translation is reused"
    );
}

#[test]
fn test_translation_failure_keeps_primary_state() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });
    let effects = act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::English));
    let [SideEffect::RequestTranslation { request, .. }] = effects.as_slice() else {
        panic!("expected translation request");
    };

    reactor.step(Event::TranslationFinished {
        request: *request,
        outcome: Err("No response from translator".into()),
    });

    assert_eq!(reactor.state.status(), AnalysisStatus::Success);
    assert!(reactor.state.translation.cached.is_none());
    assert!(reactor.state.translation.pending.is_none());
    assert_eq!(reactor.state.language, PromptLanguage::Original, "no English label on the original text");
}

#[test]
fn test_new_result_invalidates_translation() {
    let mut reactor = Reactor::new();
    let request = start_analysis(&mut reactor, "p");
    reactor.step(Event::AnalysisFinished {
        request,
        outcome: Ok(sample_result(60.0)),
    });
    let effects = act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::English));
    let [SideEffect::RequestTranslation { request: old_translation, .. }] = effects.as_slice() else {
        panic!("expected translation request");
    };
    let old_translation = *old_translation;

    let effects = act(&mut reactor, UserAction::Reanalyze);
    let [SideEffect::RequestAnalysis { request, .. }] = effects.as_slice() else {
        panic!("expected analysis request");
    };
    reactor.step(Event::AnalysisFinished {
        request: *request,
        outcome: Ok(sample_result(95.0)),
    });
    assert_eq!(reactor.state.language, PromptLanguage::Original);

    reactor.step(Event::TranslationFinished {
        request: old_translation,
        outcome: Ok("for the old result".into()),
    });
    assert!(reactor.state.translation.cached.is_none(), "stale translation discarded");
}

#[test]
fn test_translation_needs_a_result() {
    let mut reactor = Reactor::new();
    assert!(act(&mut reactor, UserAction::SelectLanguage(PromptLanguage::English)).is_empty());
    assert_eq!(reactor.state.language, PromptLanguage::English);
}

#[test]
fn test_status_graph_rejects_completion_without_request() {
    assert_eq!(
        StatusGraph::transition(AnalysisStatus::Success, StatusRequest::Resolved),
        None
    );
    assert_eq!(
        StatusGraph::transition(AnalysisStatus::Error, StatusRequest::Failed),
        None
    );
    assert_eq!(
        StatusGraph::transition(AnalysisStatus::Loading, StatusRequest::Resolved),
        Some(AnalysisStatus::Success)
    );
    assert_eq!(
        StatusGraph::transition(AnalysisStatus::Success, StatusRequest::Dismiss),
        Some(AnalysisStatus::Idle)
    );
}

#[test]
fn test_every_reduce_bumps_version() {
    let mut reactor = Reactor::new();
    let before = reactor.state.version;
    reactor.step(caret(1.0, 1.0, Some("t"), Some(1)));
    assert_eq!(reactor.state.version, before + 3, "text, pid and position deltas");
}
