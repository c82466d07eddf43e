use std::future::Future;

pub mod analysis;
pub mod client;
pub mod error;
pub mod translate;

pub use analysis::{AnalysisResult, ScoreTier};
pub use client::GeminiClient;
pub use error::ServiceError;

/// The opaque analysis collaborator. One call per trigger, no retry.
pub trait PromptAnalyzer: Clone + Send + Sync + 'static {
    fn analyze(&self, prompt: String) -> impl Future<Output = Result<AnalysisResult, ServiceError>> + Send;

    fn translate(&self, text: String) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

impl PromptAnalyzer for GeminiClient {
    async fn analyze(&self, prompt: String) -> Result<AnalysisResult, ServiceError> {
        self.analyze_prompt(&prompt).await
    }

    async fn translate(&self, text: String) -> Result<String, ServiceError> {
        self.translate_to_english(&text).await
    }
}
