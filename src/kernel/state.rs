use super::event::{PromptLanguage, RequestId};
use super::status::AnalysisStatus;
use crate::caret::mapper::LogicalPosition;
use crate::services::llm::AnalysisResult;

/// Primary session state. `Success` and `Error` are only reached from a
/// pending request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Loading,
    Success(AnalysisResult),
    Error(String),
}

impl AnalysisPhase {
    pub fn status(&self) -> AnalysisStatus {
        match self {
            AnalysisPhase::Idle => AnalysisStatus::Idle,
            AnalysisPhase::Loading => AnalysisStatus::Loading,
            AnalysisPhase::Success(_) => AnalysisStatus::Success,
            AnalysisPhase::Error(_) => AnalysisStatus::Error,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisPhase::Success(result) => Some(result),
            _ => None,
        }
    }
}

/// English rendering of the current result's optimized prompt.
/// Cached until a new result replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationState {
    pub cached: Option<String>,
    pub pending: Option<RequestId>,
}

/// Strict state delta. This is the ONLY way state mutates.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDelta {
    CaretMoved(LogicalPosition),
    ProcessObserved(u32),
    PromptTextSet(String),
    AnalysisStarted(RequestId),
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed(String),
    /// Back to Idle with the sidebar closed
    Dismissed,
    SidebarSet(bool),
    ManualModeSet(bool),
    LanguageSelected(PromptLanguage),
    TranslationStarted(RequestId),
    TranslationCached(String),
    TranslationAbandoned,
    Copied(bool),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    phase: AnalysisPhase,
    pub sidebar_open: bool,
    pub manual_mode: bool,
    /// Sticky: only replaced by a newer observation carrying an id
    pub active_process_id: Option<u32>,
    pub latest_position: Option<LogicalPosition>,
    pub prompt_text: String,
    /// The analysis call whose answer will be accepted
    pub pending_analysis: Option<RequestId>,
    pub language: PromptLanguage,
    pub translation: TranslationState,
    /// Set by apply-fix until the view moves on
    pub copied: bool,
    /// Bumped on every reduce
    pub version: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &AnalysisPhase {
        &self.phase
    }

    pub fn status(&self) -> AnalysisStatus {
        self.phase.status()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.phase.result()
    }

    pub fn has_prompt(&self) -> bool {
        !self.prompt_text.trim().is_empty()
    }

    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;
        // Caret traffic keeps the copy confirmation; anything else clears it
        if !matches!(
            delta,
            StateDelta::CaretMoved(_)
                | StateDelta::ProcessObserved(_)
                | StateDelta::PromptTextSet(_)
                | StateDelta::Copied(_)
        ) {
            self.copied = false;
        }

        match delta {
            StateDelta::CaretMoved(position) => {
                self.latest_position = Some(position);
            }
            StateDelta::ProcessObserved(pid) => {
                self.active_process_id = Some(pid);
            }
            StateDelta::PromptTextSet(text) => {
                self.prompt_text = text;
            }
            StateDelta::AnalysisStarted(request) => {
                self.phase = AnalysisPhase::Loading;
                self.pending_analysis = Some(request);
            }
            StateDelta::AnalysisSucceeded(result) => {
                self.phase = AnalysisPhase::Success(result);
                self.pending_analysis = None;
                self.sidebar_open = true;
                // A fresh result invalidates the old translation
                self.translation = TranslationState::default();
                self.language = PromptLanguage::Original;
            }
            StateDelta::AnalysisFailed(message) => {
                self.phase = AnalysisPhase::Error(message);
                self.pending_analysis = None;
                self.sidebar_open = true;
            }
            StateDelta::Dismissed => {
                self.phase = AnalysisPhase::Idle;
                self.sidebar_open = false;
                self.manual_mode = false;
            }
            StateDelta::SidebarSet(open) => {
                self.sidebar_open = open;
            }
            StateDelta::ManualModeSet(manual) => {
                self.manual_mode = manual;
            }
            StateDelta::LanguageSelected(language) => {
                self.language = language;
            }
            StateDelta::TranslationStarted(request) => {
                self.translation.pending = Some(request);
            }
            StateDelta::TranslationCached(text) => {
                self.translation.cached = Some(text);
                self.translation.pending = None;
            }
            StateDelta::TranslationAbandoned => {
                self.translation.pending = None;
                // Nothing English to show
                self.language = PromptLanguage::Original;
            }
            StateDelta::Copied(copied) => {
                self.copied = copied;
            }
        }
    }
}
