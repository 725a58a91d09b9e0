//! Answer generation with source provenance

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::types::{RetrievalResult, SourceRef};

use super::prompt::PromptBuilder;

/// Model output plus the chunks it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    /// Generated text
    pub text: String,
    /// Chunks used, in retrieval order
    pub sources: Vec<SourceRef>,
}

/// Sends prompts to the generative model
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    /// Create a generator over an LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Model name, for logging and info
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Complete a prompt in one round trip; no retries, no streaming
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.llm.generate(prompt).await.map_err(|e| match e {
            Error::Generation(_) => e,
            other => Error::Generation(other.to_string()),
        })
    }

    /// Answer `question` from retrieved chunks
    pub async fn answer(&self, question: &str, results: &[RetrievalResult]) -> Result<GeneratedAnswer> {
        let prompt = PromptBuilder::rag_prompt(question, results);
        self.generate_with_sources(&prompt, results).await
    }

    /// Explain retrieved chunks when no question was asked
    pub async fn explain(&self, results: &[RetrievalResult]) -> Result<GeneratedAnswer> {
        let prompt = PromptBuilder::rag_explain_prompt(results);
        self.generate_with_sources(&prompt, results).await
    }

    async fn generate_with_sources(
        &self,
        prompt: &str,
        results: &[RetrievalResult],
    ) -> Result<GeneratedAnswer> {
        let text = self.generate(prompt).await?;
        Ok(GeneratedAnswer {
            text,
            sources: results.iter().map(SourceRef::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records prompts and replies with a fixed answer or error
    struct ScriptedLlm {
        prompts: Mutex<Vec<String>>,
        reply: std::result::Result<String, String>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(Error::internal(message.clone())),
            }
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    fn results() -> Vec<RetrievalResult> {
        vec![
            RetrievalResult {
                id: "doc.txt_chunk_1".to_string(),
                text: "Water is wet.".to_string(),
                file_name: "doc.txt".to_string(),
                chunk_index: 1,
                score: 0.912_345,
            },
            RetrievalResult {
                id: "doc.txt_chunk_0".to_string(),
                text: "The sky is blue.".to_string(),
                file_name: "doc.txt".to_string(),
                chunk_index: 0,
                score: 0.5004,
            },
        ]
    }

    #[tokio::test]
    async fn test_answer_with_sources() {
        let llm = Arc::new(ScriptedLlm {
            prompts: Mutex::new(Vec::new()),
            reply: Ok("Yes, water is wet.".to_string()),
        });
        let generator = AnswerGenerator::new(llm.clone());

        let answer = generator.answer("Is water wet?", &results()).await.unwrap();
        assert_eq!(answer.text, "Yes, water is wet.");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0].chunk_index, 1);
        assert!((answer.sources[0].score - 0.912).abs() < 1e-6);
        assert!((answer.sources[1].score - 0.5).abs() < 1e-6);

        let prompts = llm.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("[Chunk 1]\nWater is wet."));
        assert!(prompts[0].contains("Question: Is water wet?"));
    }

    #[tokio::test]
    async fn test_failure_becomes_generation_error() {
        let llm = Arc::new(ScriptedLlm {
            prompts: Mutex::new(Vec::new()),
            reply: Err("model overloaded".to_string()),
        });
        let generator = AnswerGenerator::new(llm);

        let err = generator.explain(&results()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("model overloaded"));
        assert_eq!(generator.model(), "scripted-1");
    }
}
