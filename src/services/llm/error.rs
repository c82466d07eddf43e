use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM server error: {0}")]
    Status(reqwest::StatusCode),
    #[error("No response from AI")]
    EmptyResponse,
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Score {0} is outside 0-100")]
    ScoreOutOfRange(f64),
}
