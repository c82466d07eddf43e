use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single sample emitted by the external caret watcher.
/// Physical (unscaled) pixels. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretObservation {
    #[serde(rename = "x")]
    pub physical_x: i32,
    #[serde(rename = "y")]
    pub physical_y: i32,
    #[serde(rename = "height")]
    pub physical_height: i32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "processId")]
    pub owner_process_id: Option<u32>,
    #[serde(default)]
    pub process_name: Option<String>,
}

impl CaretObservation {
    pub fn new(physical_x: i32, physical_y: i32, physical_height: i32) -> Self {
        Self {
            physical_x,
            physical_y,
            physical_height,
            text: None,
            owner_process_id: None,
            process_name: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_process(mut self, process_id: u32) -> Self {
        self.owner_process_id = Some(process_id);
        self
    }

    /// Captured text, if the watcher extracted any non-empty content.
    pub fn captured_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Owning process, treating pid 0 (no owner) as absent.
    pub fn process_id(&self) -> Option<u32> {
        self.owner_process_id.filter(|pid| *pid != 0)
    }
}

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("not a record: expected a single JSON object per line")]
    NotARecord,
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("negative caret height {0}")]
    NegativeHeight(i32),
}

/// Parse one line of watcher output.
/// Lines that are not `{...}` are rejected before JSON decoding is attempted.
pub fn parse_record(line: &str) -> Result<CaretObservation, ObservationError> {
    let line = line.trim();
    if !(line.starts_with('{') && line.ends_with('}')) {
        return Err(ObservationError::NotARecord);
    }

    let observation: CaretObservation = serde_json::from_str(line)?;
    if observation.physical_height < 0 {
        return Err(ObservationError::NegativeHeight(observation.physical_height));
    }

    Ok(observation)
}
