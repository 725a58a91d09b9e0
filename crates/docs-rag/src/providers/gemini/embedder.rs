//! Gemini embedding provider using text-embedding-004

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GeminiApi;
use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

/// Gemini embedding provider
pub struct GeminiEmbedder {
    api: GeminiApi,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder
    ///
    /// # Arguments
    /// * `config` - Gemini settings; an API key is required
    /// * `dimensions` - expected vector length (768 for text-embedding-004)
    pub fn new(config: &GeminiConfig, dimensions: usize) -> Result<Self> {
        Ok(Self {
            api: GeminiApi::new(config)?,
            model: config.embedding_model.clone(),
            dimensions,
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response: EmbedResponse = self
            .api
            .call(&self.model, "embedContent", &request)
            .await
            .map_err(Error::Embedding)?;

        response
            .embedding
            .map(|e| e.values)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Embedding("No embedding in Gemini response".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.api.model_available(&self.model).await)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
