use crate::caret::mapper::LogicalPosition;
use crate::services::llm::AnalysisResult;

/// Monotonic id of one outbound collaborator request.
/// Responses carrying an id that is no longer current are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone)]
pub enum Event {
    /// A mapped caret observation
    Caret(CaretUpdate),
    /// Something the user did in the overlay
    Action(UserAction),
    AnalysisFinished {
        request: RequestId,
        outcome: Result<AnalysisResult, String>,
    },
    TranslationFinished {
        request: RequestId,
        outcome: Result<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaretUpdate {
    pub position: LogicalPosition,
    pub process_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptLanguage {
    /// Whatever language the analysis was produced in
    #[default]
    Original,
    English,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Analyze,
    Reanalyze,
    ToggleSidebar,
    CloseSidebar,
    OpenManual,
    SubmitManual(String),
    /// Editor change without triggering analysis
    SetPromptText(String),
    /// Copy text to the clipboard
    ApplyFix(String),
    /// Type text into the tracked process
    Insert(String),
    SelectLanguage(PromptLanguage),
    Quit,
}

impl From<UserAction> for Event {
    fn from(action: UserAction) -> Self {
        Event::Action(action)
    }
}

impl From<CaretUpdate> for Event {
    fn from(update: CaretUpdate) -> Self {
        Event::Caret(update)
    }
}
