use super::event::RequestId;

/// Work the reactor asks the driver to perform. The reactor itself never
/// touches the network, the clipboard or other processes.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Start an analysis call, replacing any call still in flight
    RequestAnalysis { request: RequestId, prompt: String },
    RequestTranslation { request: RequestId, text: String },
    CopyToClipboard(String),
    InsertText { process_id: u32, text: String },
    Quit,
}
