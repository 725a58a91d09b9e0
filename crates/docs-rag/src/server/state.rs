//! Application state for the RAG server

use std::sync::Arc;

use crate::config::{BackendProvider, RagConfig};
use crate::error::Result;
use crate::pipeline::RagPipeline;
use crate::providers::{
    EmbeddingProvider, GeminiClient, GeminiEmbedder, InMemoryVectorStore, LlmProvider,
    OllamaClient, OllamaEmbedder, OllamaLlm, PineconeStore, VectorStoreProvider,
};
use crate::retrieval::VectorIndex;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Upload / question pipeline
    pipeline: RagPipeline,
    /// LLM provider (Ollama or Gemini)
    llm_provider: Arc<dyn LlmProvider>,
    /// Embedding provider, when an index is configured
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    /// Vector store, when an index is configured
    vector_store_provider: Option<Arc<dyn VectorStoreProvider>>,
}

impl AppState {
    /// Create application state, building providers for the configured backend.
    ///
    /// Provider clients are created once here and shared by every request.
    pub async fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Initializing application state (backend: {:?}, rag: {})",
            config.backend,
            config.rag_enabled
        );

        let (llm, embedder, store): (
            Arc<dyn LlmProvider>,
            Option<Arc<dyn EmbeddingProvider>>,
            Option<Arc<dyn VectorStoreProvider>>,
        ) = match config.backend {
            BackendProvider::Local => {
                tracing::info!("Using local backend (Ollama + in-memory index)");
                let client = Arc::new(OllamaClient::new(&config.ollama)?);
                let embedder = Arc::new(OllamaEmbedder::from_client(
                    Arc::clone(&client),
                    config.embeddings.dimensions,
                ));
                let llm = Arc::new(OllamaLlm::from_client(client));
                tracing::info!(
                    "Ollama providers initialized (embedding: {}, llm: {})",
                    config.ollama.embed_model,
                    config.ollama.generate_model
                );
                (llm, Some(embedder), Some(Arc::new(InMemoryVectorStore::new())))
            }
            BackendProvider::Cloud => {
                tracing::info!("Using cloud backend (Gemini + Pinecone)");
                let llm = Arc::new(GeminiClient::new(&config.gemini)?);

                let has_index = config.rag_enabled || config.pinecone.host.is_some();
                let (embedder, store): (
                    Option<Arc<dyn EmbeddingProvider>>,
                    Option<Arc<dyn VectorStoreProvider>>,
                ) = if has_index {
                    let embedder =
                        Arc::new(GeminiEmbedder::new(&config.gemini, config.embeddings.dimensions)?);
                    let store = Arc::new(PineconeStore::new(&config.pinecone)?);
                    tracing::info!(
                        "Pinecone index {} connected (embedding: {})",
                        store.index_name(),
                        config.gemini.embedding_model
                    );
                    (Some(embedder), Some(store))
                } else {
                    (None, None)
                };

                tracing::info!("Gemini initialized (llm: {})", config.gemini.generation_model);
                (llm, embedder, store)
            }
        };

        Self::with_providers(config, llm, embedder, store)
    }

    /// Create application state from ready-made providers
    pub fn with_providers(
        config: RagConfig,
        llm: Arc<dyn LlmProvider>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
        store: Option<Arc<dyn VectorStoreProvider>>,
    ) -> Result<Self> {
        let index = match (&embedder, &store) {
            (Some(embedder), Some(store)) => Some(Arc::new(VectorIndex::with_config(
                Arc::clone(embedder),
                Arc::clone(store),
                &config.indexing,
            ))),
            _ => None,
        };

        let pipeline = RagPipeline::new(&config, Arc::clone(&llm), index)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                llm_provider: llm,
                embedding_provider: embedder,
                vector_store_provider: store,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the pipeline
    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }

    /// Get LLM provider
    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm_provider
    }

    /// Get embedding provider
    pub fn embedding_provider(&self) -> Option<&Arc<dyn EmbeddingProvider>> {
        self.inner.embedding_provider.as_ref()
    }

    /// Get vector store provider
    pub fn vector_store_provider(&self) -> Option<&Arc<dyn VectorStoreProvider>> {
        self.inner.vector_store_provider.as_ref()
    }

    /// Check that every configured provider answers its health check
    pub async fn is_ready(&self) -> bool {
        if !self.inner.llm_provider.health_check().await.unwrap_or(false) {
            return false;
        }
        if let Some(embedder) = &self.inner.embedding_provider {
            if !embedder.health_check().await.unwrap_or(false) {
                return false;
            }
        }
        if let Some(store) = &self.inner.vector_store_provider {
            if !store.health_check().await.unwrap_or(false) {
                return false;
            }
        }
        true
    }
}
