//! Gemini client for text generation
//!
//! Prompts go out as a single user turn; the text parts of the first
//! candidate are concatenated into the answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GeminiApi;
use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use crate::providers::llm::LlmProvider;

/// Gemini generation client
pub struct GeminiClient {
    api: GeminiApi,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client (default model: gemini-1.5-flash)
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        Ok(Self {
            api: GeminiApi::new(config)?,
            model: config.generation_model.clone(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::Generation(format!("Prompt blocked by Gemini: {}", reason)));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Generation("No text in Gemini response".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(
            "Generating with Gemini model {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let response: GenerateResponse = self
            .api
            .call(&self.model, "generateContent", &request)
            .await
            .map_err(Error::Generation)?;

        response.into_text()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.api.model_available(&self.model).await)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_text_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Water "},{"text":"is wet."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Water is wet.");
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_empty_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(response.into_text(), Err(Error::Generation(_))));
    }
}
