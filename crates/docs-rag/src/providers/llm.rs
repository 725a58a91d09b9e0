//! LLM provider trait for text completion

use async_trait::async_trait;
use crate::error::Result;

/// Trait for the generative model: prompt in, text out
///
/// Implementations:
/// - `GeminiClient`: Generative Language API (gemini-1.5-flash)
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt in a single round trip
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
