use serde::{Deserialize, Serialize};

/// Analysis lifecycle tag, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Requests that move the analysis lifecycle. The graph validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRequest {
    /// Analyze / re-analyze with non-empty text
    Begin,
    /// The pending call resolved
    Resolved,
    /// The pending call failed
    Failed,
    /// Sidebar closed outside manual mode
    Dismiss,
}

pub struct StatusGraph;

impl StatusGraph {
    /// Pure function: (Current Status, Request) -> New Status.
    /// Returns None if the transition is invalid.
    ///
    /// Completion is accepted from Idle as well as Loading: dismissing the
    /// sidebar does not cancel the call in flight, so its answer still lands.
    pub fn transition(current: AnalysisStatus, request: StatusRequest) -> Option<AnalysisStatus> {
        use AnalysisStatus::*;
        use StatusRequest::*;

        match (current, request) {
            (_, Begin) => Some(Loading),
            (_, Dismiss) => Some(Idle),

            (Loading | Idle, Resolved) => Some(Success),
            (Loading | Idle, Failed) => Some(Error),

            // A completion with nothing outstanding
            (Success | Error, Resolved | Failed) => None,
        }
    }
}
