use promptly::caret::mapper::LogicalPosition;
use promptly::kernel::event::{CaretUpdate, Event, PromptLanguage, UserAction};
use promptly::kernel::effect::SideEffect;
use promptly::kernel::reactor::Reactor;
use promptly::presentation::{OverlayView, SidebarView, WidgetBadge};
use promptly::services::llm::{AnalysisResult, ScoreTier};

const OFFSET: f64 = 20.0;

fn result(score: f64) -> AnalysisResult {
    AnalysisResult {
        score,
        summary: "Solid".into(),
        strengths: vec!["Specific".into()],
        weaknesses: vec![],
        suggestions: vec!["Add an example".into()],
        optimized_prompt: "원본 프롬프트".into(),
    }
}

fn succeeded(score: f64) -> Reactor {
    let mut reactor = Reactor::new();
    reactor.step(Event::Action(UserAction::SetPromptText("p".into())));
    let effects = reactor.step(Event::Action(UserAction::Analyze));
    let [SideEffect::RequestAnalysis { request, .. }] = effects.as_slice() else {
        panic!("expected analysis request");
    };
    reactor.step(Event::AnalysisFinished {
        request: *request,
        outcome: Ok(result(score)),
    });
    reactor
}

#[test]
fn test_widget_anchor_follows_caret_with_offset() {
    let mut reactor = Reactor::new();
    assert_eq!(OverlayView::project(&reactor.state, OFFSET).widget.anchor, None);

    reactor.step(Event::Caret(CaretUpdate {
        position: LogicalPosition {
            x: 100.0,
            y: 200.0,
            height: 16.0,
            text: None,
        },
        process_id: None,
    }));

    let view = OverlayView::project(&reactor.state, OFFSET);
    assert_eq!(view.widget.anchor, Some((120.0, 208.0)));
    assert_eq!(view.widget.badge, WidgetBadge::Pulse);
    assert_eq!(view.sidebar, SidebarView::Closed);
}

#[test]
fn test_score_tiers() {
    assert_eq!(ScoreTier::for_score(100.0), ScoreTier::Good);
    assert_eq!(ScoreTier::for_score(80.0), ScoreTier::Good);
    assert_eq!(ScoreTier::for_score(79.9), ScoreTier::Fair);
    assert_eq!(ScoreTier::for_score(50.0), ScoreTier::Fair);
    assert_eq!(ScoreTier::for_score(49.0), ScoreTier::Poor);
    assert_eq!(ScoreTier::for_score(0.0), ScoreTier::Poor);
}

#[test]
fn test_success_view_shows_result() {
    let reactor = succeeded(85.0);
    let view = OverlayView::project(&reactor.state, OFFSET);

    assert_eq!(
        view.widget.badge,
        WidgetBadge::Score {
            value: 85.0,
            tier: ScoreTier::Good
        }
    );
    match &view.sidebar {
        SidebarView::Result {
            optimized_prompt,
            language,
            translating,
            ..
        } => {
            assert_eq!(optimized_prompt, "원본 프롬프트");
            assert_eq!(*language, PromptLanguage::Original);
            assert!(!translating);
        }
        other => panic!("expected result sidebar, got {:?}", other),
    }
    assert_eq!(view.copy_target(), Some("원본 프롬프트"));

    let text = view.render_text();
    assert!(text.contains("score 85: Solid"));
    assert!(text.contains("> Add an example"));
    assert!(!text.contains("(copied)"));
}

#[test]
fn test_copied_flag_shows_until_next_change() {
    let mut reactor = succeeded(85.0);
    reactor.step(Event::Action(UserAction::ApplyFix("원본 프롬프트".into())));
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert!(matches!(view.sidebar, SidebarView::Result { copied: true, .. }));
    assert!(view.render_text().contains("(copied)"));

    reactor.step(Event::Action(UserAction::SelectLanguage(PromptLanguage::Original)));
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert!(matches!(view.sidebar, SidebarView::Result { copied: false, .. }));
}

#[test]
fn test_english_view_falls_back_until_translated() {
    let mut reactor = succeeded(60.0);
    let effects = reactor.step(Event::Action(UserAction::SelectLanguage(PromptLanguage::English)));
    let [SideEffect::RequestTranslation { request, .. }] = effects.as_slice() else {
        panic!("expected translation request");
    };
    let request = *request;

    let view = OverlayView::project(&reactor.state, OFFSET);
    assert_eq!(view.copy_target(), Some("원본 프롬프트"), "untranslated while pending");
    assert!(matches!(view.sidebar, SidebarView::Result { translating: true, .. }));

    reactor.step(Event::TranslationFinished {
        request,
        outcome: Ok("Original prompt".into()),
    });
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert_eq!(view.copy_target(), Some("Original prompt"));

    reactor.step(Event::Action(UserAction::SelectLanguage(PromptLanguage::Original)));
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert_eq!(view.copy_target(), Some("원본 프롬프트"));
}

#[test]
fn test_failed_translation_is_labelled_original() {
    let mut reactor = succeeded(60.0);
    let effects = reactor.step(Event::Action(UserAction::SelectLanguage(PromptLanguage::English)));
    let [SideEffect::RequestTranslation { request, .. }] = effects.as_slice() else {
        panic!("expected translation request");
    };
    let request = *request;

    reactor.step(Event::TranslationFinished {
        request,
        outcome: Err("No response from AI".into()),
    });
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert!(matches!(
        view.sidebar,
        SidebarView::Result {
            language: PromptLanguage::Original,
            translating: false,
            ..
        }
    ));
    let text = view.render_text();
    assert!(text.contains("optimized (original):"));
    assert!(!text.contains("(EN)"));
}

#[test]
fn test_loading_error_and_manual_views() {
    let mut reactor = Reactor::new();
    reactor.step(Event::Action(UserAction::OpenManual));
    assert_eq!(OverlayView::project(&reactor.state, OFFSET).sidebar, SidebarView::ManualEntry);

    let effects = reactor.step(Event::Action(UserAction::SubmitManual("hello".into())));
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert_eq!(view.widget.badge, WidgetBadge::Spinner);
    assert_eq!(view.sidebar, SidebarView::Loading);

    let [SideEffect::RequestAnalysis { request, .. }] = effects.as_slice() else {
        panic!("expected analysis request");
    };
    reactor.step(Event::AnalysisFinished {
        request: *request,
        outcome: Err("Missing API key".into()),
    });
    let view = OverlayView::project(&reactor.state, OFFSET);
    assert_eq!(view.widget.badge, WidgetBadge::Alert);
    assert_eq!(
        view.sidebar,
        SidebarView::Error {
            message: "Missing API key".into()
        }
    );
    assert!(view.copy_target().is_none());
    assert!(view.render_text().contains("reanalyze"));
}
