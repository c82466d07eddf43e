//! View model of the overlay. A pure projection of `SessionState`.

use std::fmt::Write as _;

use crate::kernel::event::PromptLanguage;
use crate::kernel::state::{AnalysisPhase, SessionState};
use crate::services::llm::ScoreTier;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetBadge {
    /// Waiting for the user
    Pulse,
    Spinner,
    Score { value: f64, tier: ScoreTier },
    Alert,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    /// Left-middle anchor in logical px, None until the first caret sample
    pub anchor: Option<(f64, f64)>,
    pub badge: WidgetBadge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SidebarView {
    Closed,
    ManualEntry,
    Loading,
    Error { message: String },
    Result {
        score: f64,
        tier: ScoreTier,
        summary: String,
        strengths: Vec<String>,
        weaknesses: Vec<String>,
        suggestions: Vec<String>,
        /// Rewrite in the selected language, falling back to the original
        optimized_prompt: String,
        language: PromptLanguage,
        translating: bool,
        copied: bool,
    },
    /// Open with nothing to show yet
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub widget: WidgetView,
    pub sidebar: SidebarView,
}

impl OverlayView {
    pub fn project(state: &SessionState, widget_offset_x: f64) -> Self {
        let anchor = state
            .latest_position
            .as_ref()
            .map(|pos| (pos.x + widget_offset_x, pos.y + pos.height / 2.0));

        let badge = match state.phase() {
            AnalysisPhase::Idle => WidgetBadge::Pulse,
            AnalysisPhase::Loading => WidgetBadge::Spinner,
            AnalysisPhase::Success(result) => WidgetBadge::Score {
                value: result.score,
                tier: result.tier(),
            },
            AnalysisPhase::Error(_) => WidgetBadge::Alert,
        };

        let sidebar = if !state.sidebar_open {
            SidebarView::Closed
        } else if state.manual_mode {
            SidebarView::ManualEntry
        } else {
            match state.phase() {
                AnalysisPhase::Idle => SidebarView::Empty,
                AnalysisPhase::Loading => SidebarView::Loading,
                AnalysisPhase::Error(message) => SidebarView::Error {
                    message: message.clone(),
                },
                AnalysisPhase::Success(result) => {
                    let optimized_prompt = match (state.language, &state.translation.cached) {
                        (PromptLanguage::English, Some(translated)) => translated.clone(),
                        _ => result.optimized_prompt.clone(),
                    };
                    SidebarView::Result {
                        score: result.score,
                        tier: result.tier(),
                        summary: result.summary.clone(),
                        strengths: result.strengths.clone(),
                        weaknesses: result.weaknesses.clone(),
                        suggestions: result.suggestions.clone(),
                        optimized_prompt,
                        language: state.language,
                        translating: state.translation.pending.is_some(),
                        copied: state.copied,
                    }
                }
            }
        };

        Self {
            widget: WidgetView { anchor, badge },
            sidebar,
        }
    }

    /// The text "copy to clipboard" acts on, if a result is showing.
    pub fn copy_target(&self) -> Option<&str> {
        match &self.sidebar {
            SidebarView::Result { optimized_prompt, .. } => Some(optimized_prompt),
            _ => None,
        }
    }

    /// Plain-text rendering for the console front end.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let badge = match &self.widget.badge {
            WidgetBadge::Pulse => "[ * ]".to_string(),
            WidgetBadge::Spinner => "[ ... ]".to_string(),
            WidgetBadge::Score { value, tier } => format!("[ {:.0} {:?} ]", value, tier),
            WidgetBadge::Alert => "[ ! ]".to_string(),
        };
        match self.widget.anchor {
            Some((x, y)) => {
                let _ = writeln!(out, "widget {} at ({:.0}, {:.0})", badge, x, y);
            }
            None => {
                let _ = writeln!(out, "widget {}", badge);
            }
        }

        match &self.sidebar {
            SidebarView::Closed => {}
            SidebarView::Empty => out.push_str("sidebar: (empty)\n"),
            SidebarView::ManualEntry => out.push_str("sidebar: type `submit <prompt>`\n"),
            SidebarView::Loading => out.push_str("sidebar: analyzing...\n"),
            SidebarView::Error { message } => {
                let _ = writeln!(out, "sidebar: analysis failed: {}", message);
                out.push_str("         `reanalyze` to retry\n");
            }
            SidebarView::Result {
                score,
                summary,
                strengths,
                weaknesses,
                suggestions,
                optimized_prompt,
                language,
                translating,
                copied,
                ..
            } => {
                let _ = writeln!(out, "score {:.0}: {}", score, summary);
                for (label, items) in [("+", strengths), ("-", weaknesses), (">", suggestions)] {
                    for item in items {
                        let _ = writeln!(out, "  {} {}", label, item);
                    }
                }
                let lang = match (language, translating) {
                    (_, true) => "EN...",
                    (PromptLanguage::English, false) => "EN",
                    (PromptLanguage::Original, false) => "original",
                };
                let _ = writeln!(out, "optimized ({}):\n{}", lang, optimized_prompt);
                if *copied {
                    out.push_str("(copied)\n");
                }
            }
        }

        out
    }
}
