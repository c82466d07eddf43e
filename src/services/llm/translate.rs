use tracing::error;

use super::client::GeminiClient;
use super::error::ServiceError;

const TRANSLATOR_INSTRUCTION: &str = "You are a professional translator specializing in AI prompts.\n\
Translate the given prompt into natural, professional English.\n\
Maintain the intent, tone, and technical accuracy.\n\
Output ONLY the translated text, nothing else.";

impl GeminiClient {
    /// Translate an optimized prompt into English. Plain text in, plain text out.
    pub async fn translate_to_english(&self, text: &str) -> Result<String, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyPrompt);
        }

        let contents = format!("Translate this to English:\n\n{}", text);
        match self.generate(TRANSLATOR_INSTRUCTION, contents, None).await {
            Ok(translated) => Ok(translated.trim().to_string()),
            Err(e) => {
                error!("Translation error: {}", e);
                Err(e)
            }
        }
    }
}
