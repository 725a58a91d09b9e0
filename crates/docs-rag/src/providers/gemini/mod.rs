//! Google Generative Language API (Gemini) providers
//!
//! Both providers authenticate with an API key sent in the `x-goog-api-key`
//! header, so the key never appears in URLs or error messages.

mod client;
mod embedder;

pub use client::GeminiClient;
pub use embedder::GeminiEmbedder;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{Error, Result};

/// Shared HTTP plumbing for Gemini model calls
#[derive(Clone)]
pub(crate) struct GeminiApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiApi {
    pub(crate) fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// `{base_url}/models/{model}:{method}`
    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// POST a model method. Errors come back as plain messages for the caller
    /// to wrap in its own error kind.
    pub(crate) async fn call<B, R>(
        &self,
        model: &str,
        method: &str,
        body: &B,
    ) -> std::result::Result<R, String>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(self.endpoint(model, method))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Gemini request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Gemini {} failed ({}): {}", method, status, body));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))
    }

    /// GET model info; success means the key and model are usable
    pub(crate) async fn model_available(&self, model: &str) -> bool {
        let url = format!("{}/models/{}", self.base_url, model);
        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
