use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use super::client::{GeminiClient, GenerationConfig};
use super::error::ServiceError;

/// Structured critique of a prompt. All fields arrive together or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub optimized_prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreTier {
    Good,
    Fair,
    Poor,
}

impl AnalysisResult {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::for_score(self.score)
    }
}

impl ScoreTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTier::Good
        } else if score >= 50.0 {
            ScoreTier::Fair
        } else {
            ScoreTier::Poor
        }
    }
}

/// Decode the model's JSON text into a result. Missing fields fail the whole
/// decode; the score must land in 0..=100.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, ServiceError> {
    let result: AnalysisResult = serde_json::from_str(text.trim())?;
    if !(0.0..=100.0).contains(&result.score) {
        return Err(ServiceError::ScoreOutOfRange(result.score));
    }
    Ok(result)
}

fn system_instruction(language: &str) -> String {
    format!(
        "You are a world-class Expert Prompt Engineer and AI Interaction Specialist.\n\
         Your goal is to help users write better prompts for Large Language Models (LLMs).\n\
         Analyze the user's input prompt based on clarity, specificity, context, constraints, and persona.\n\n\
         IMPORTANT: Provide ALL output in {language}, both the analysis and the optimized prompt."
    )
}

fn response_schema(language: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER", "description": "A score from 0 to 100 rating the prompt quality." },
            "summary": { "type": "STRING", "description": format!("A one-sentence summary of the analysis in {language}.") },
            "strengths": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": format!("List of 1-3 things the prompt does well in {language}.")
            },
            "weaknesses": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": format!("List of 1-3 things the prompt lacks in {language}.")
            },
            "suggestions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": format!("Specific, actionable advice to improve the prompt in {language}.")
            },
            "optimizedPrompt": { "type": "STRING", "description": format!("A fully rewritten, optimized version of the prompt in {language}.") }
        },
        "required": ["score", "summary", "strengths", "weaknesses", "suggestions", "optimizedPrompt"]
    })
}

impl GeminiClient {
    /// Score and rewrite a prompt. Blank prompts are rejected before any request.
    pub async fn analyze_prompt(&self, prompt: &str) -> Result<AnalysisResult, ServiceError> {
        if prompt.trim().is_empty() {
            return Err(ServiceError::EmptyPrompt);
        }

        let language = self.output_language();
        let generation = GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: Some(response_schema(language)),
        };

        let outcome = async {
            let text = self
                .generate(&system_instruction(language), prompt.to_string(), Some(generation))
                .await?;
            parse_analysis(&text)
        }
        .await;

        match &outcome {
            Ok(result) => info!("Analysis complete: score {}", result.score),
            Err(e) => error!("Error analyzing prompt: {}", e),
        }
        outcome
    }
}
