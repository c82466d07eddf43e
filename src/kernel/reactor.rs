use tracing::{debug, info, warn};

use super::effect::SideEffect;
use super::event::{CaretUpdate, Event, PromptLanguage, RequestId, UserAction};
use super::state::{SessionState, StateDelta};
use super::status::{AnalysisStatus, StatusGraph, StatusRequest};
use crate::services::llm::AnalysisResult;

/// Owns the session state and all transition rules.
pub struct Reactor {
    pub state: SessionState,
    next_request: u64,
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor {
    pub fn new() -> Self {
        Self {
            state: SessionState::new(),
            next_request: 0,
        }
    }

    /// Pure Step: applies one event and returns side effects for the driver.
    /// MUST NOT await I/O or timers.
    pub fn step(&mut self, event: Event) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        match event {
            Event::Caret(update) => self.on_caret(update),
            Event::Action(action) => self.on_action(action, &mut effects),
            Event::AnalysisFinished { request, outcome } => {
                self.on_analysis_finished(request, outcome)
            }
            Event::TranslationFinished { request, outcome } => {
                self.on_translation_finished(request, outcome)
            }
        }

        effects
    }

    fn allocate_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn on_caret(&mut self, update: CaretUpdate) {
        // Last write wins; absent fields leave earlier values in place.
        if let Some(text) = update.position.text.as_deref().filter(|t| !t.is_empty()) {
            self.state.reduce(StateDelta::PromptTextSet(text.to_string()));
        }
        if let Some(pid) = update.process_id {
            self.state.reduce(StateDelta::ProcessObserved(pid));
        }
        self.state.reduce(StateDelta::CaretMoved(update.position));
    }

    fn on_action(&mut self, action: UserAction, effects: &mut Vec<SideEffect>) {
        debug!("Action: {:?}", action);

        match action {
            UserAction::Analyze | UserAction::Reanalyze => self.begin_analysis(effects),

            UserAction::ToggleSidebar => {
                // First open with text behaves as analyze
                if self.state.status() == AnalysisStatus::Idle && self.state.has_prompt() {
                    self.begin_analysis(effects);
                } else {
                    let open = !self.state.sidebar_open;
                    self.state.reduce(StateDelta::SidebarSet(open));
                }
            }

            UserAction::CloseSidebar => {
                if self.state.manual_mode {
                    self.state.reduce(StateDelta::ManualModeSet(false));
                    self.state.reduce(StateDelta::SidebarSet(false));
                } else if let Some(next) =
                    StatusGraph::transition(self.state.status(), StatusRequest::Dismiss)
                {
                    debug!("Sidebar closed: {:?} -> {:?}", self.state.status(), next);
                    self.state.reduce(StateDelta::Dismissed);
                }
            }

            UserAction::OpenManual => {
                self.state.reduce(StateDelta::ManualModeSet(true));
                self.state.reduce(StateDelta::SidebarSet(true));
            }

            UserAction::SubmitManual(text) => {
                self.state.reduce(StateDelta::PromptTextSet(text));
                self.state.reduce(StateDelta::ManualModeSet(false));
                self.begin_analysis(effects);
            }

            UserAction::SetPromptText(text) => {
                self.state.reduce(StateDelta::PromptTextSet(text));
            }

            UserAction::ApplyFix(text) => {
                if text.trim().is_empty() {
                    debug!("Nothing to copy");
                } else {
                    self.state.reduce(StateDelta::Copied(true));
                    effects.push(SideEffect::CopyToClipboard(text));
                }
            }

            UserAction::Insert(text) => match self.state.active_process_id {
                Some(process_id) if !text.trim().is_empty() => {
                    effects.push(SideEffect::InsertText { process_id, text });
                }
                Some(_) => debug!("Nothing to insert"),
                None => warn!("Insert requested but no target process is known"),
            },

            UserAction::SelectLanguage(language) => {
                self.state.reduce(StateDelta::LanguageSelected(language));
                if language == PromptLanguage::English {
                    self.request_translation(effects);
                }
            }

            UserAction::Quit => effects.push(SideEffect::Quit),
        }
    }

    /// Idle/Success/Error/Loading -> Loading. Blank text is a no-op.
    /// A call already in flight is superseded; its answer will be discarded.
    fn begin_analysis(&mut self, effects: &mut Vec<SideEffect>) {
        if !self.state.has_prompt() {
            debug!("Analyze ignored: prompt is empty");
            return;
        }
        if StatusGraph::transition(self.state.status(), StatusRequest::Begin).is_none() {
            return;
        }

        if let Some(previous) = self.state.pending_analysis {
            info!("Replacing in-flight analysis {:?}", previous);
        }

        let request = self.allocate_request();
        self.state.reduce(StateDelta::AnalysisStarted(request));
        effects.push(SideEffect::RequestAnalysis {
            request,
            prompt: self.state.prompt_text.clone(),
        });
    }

    fn on_analysis_finished(&mut self, request: RequestId, outcome: Result<AnalysisResult, String>) {
        // STALE REJECTION: only the most recent request may land
        if self.state.pending_analysis != Some(request) {
            info!(
                "Discarded stale analysis response {:?} (pending {:?})",
                request, self.state.pending_analysis
            );
            return;
        }

        let status_request = if outcome.is_ok() {
            StatusRequest::Resolved
        } else {
            StatusRequest::Failed
        };
        if StatusGraph::transition(self.state.status(), status_request).is_none() {
            warn!("Ignored analysis completion in {:?}", self.state.status());
            return;
        }

        match outcome {
            Ok(result) => self.state.reduce(StateDelta::AnalysisSucceeded(result)),
            Err(message) => {
                warn!("Analysis failed: {}", message);
                self.state.reduce(StateDelta::AnalysisFailed(message));
            }
        }
    }

    /// Lazily fetch the English rewrite, at most once per result.
    fn request_translation(&mut self, effects: &mut Vec<SideEffect>) {
        let Some(text) = self.state.result().map(|r| r.optimized_prompt.clone()) else {
            return;
        };
        if self.state.translation.cached.is_some() || self.state.translation.pending.is_some() {
            return;
        }

        let request = self.allocate_request();
        self.state.reduce(StateDelta::TranslationStarted(request));
        effects.push(SideEffect::RequestTranslation { request, text });
    }

    fn on_translation_finished(&mut self, request: RequestId, outcome: Result<String, String>) {
        if self.state.translation.pending != Some(request) {
            info!("Discarded stale translation response {:?}", request);
            return;
        }

        match outcome {
            Ok(text) => self.state.reduce(StateDelta::TranslationCached(text)),
            Err(message) => {
                warn!("Translation failed, showing original: {}", message);
                self.state.reduce(StateDelta::TranslationAbandoned);
            }
        }
    }
}
