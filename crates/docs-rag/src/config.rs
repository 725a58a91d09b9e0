//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Backend provider (local or cloud)
    pub backend: BackendProvider,
    /// Chunk, embed and retrieve (true) or send whole documents (false)
    pub rag_enabled: bool,
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Index write configuration
    pub indexing: IndexingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Gemini configuration (cloud backend)
    pub gemini: GeminiConfig,
    /// Pinecone configuration (cloud backend)
    pub pinecone: PineconeConfig,
    /// Ollama configuration (local backend)
    pub ollama: OllamaConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            backend: BackendProvider::default(),
            rag_enabled: true,
            server: ServerConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            indexing: IndexingConfig::default(),
            embeddings: EmbeddingConfig::default(),
            gemini: GeminiConfig::default(),
            pinecone: PineconeConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Load from `DOCS_RAG_CONFIG` if set, otherwise defaults, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("DOCS_RAG_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override secrets and deployment settings from environment variables.
    ///
    /// Takes a lookup function so tests do not have to touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(key) = lookup("PINECONE_API_KEY") {
            self.pinecone.api_key = Some(key);
        }
        if let Some(name) = lookup("PINECONE_INDEX_NAME") {
            self.pinecone.index_name = name;
        }
        if let Some(host) = lookup("PINECONE_HOST") {
            self.pinecone.host = Some(host);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.ollama.base_url = url;
        }
        if let Some(backend) = lookup("DOCS_RAG_BACKEND") {
            match backend.to_lowercase().as_str() {
                "local" => self.backend = BackendProvider::Local,
                "cloud" => self.backend = BackendProvider::Cloud,
                other => tracing::warn!("Ignoring unknown DOCS_RAG_BACKEND value: {}", other),
            }
        }
        if let Some(enabled) = lookup("DOCS_RAG_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.rag_enabled = true,
                "0" | "false" | "no" | "off" => self.rag_enabled = false,
                other => tracing::warn!("Ignoring unknown DOCS_RAG_ENABLED value: {}", other),
            }
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Check values that would otherwise fail deep inside a request
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be > 0".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be > 0".to_string()));
        }
        if self.indexing.batch_size == 0 || self.indexing.embed_concurrency == 0 {
            return Err(Error::Config(
                "indexing.batch_size and indexing.embed_concurrency must be > 0".to_string(),
            ));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be > 0".to_string()));
        }

        if self.backend == BackendProvider::Cloud {
            if self.gemini.api_key.as_deref().unwrap_or("").is_empty() {
                return Err(Error::Config(
                    "Cloud backend requires GEMINI_API_KEY".to_string(),
                ));
            }
            if self.rag_enabled {
                if self.pinecone.api_key.as_deref().unwrap_or("").is_empty() {
                    return Err(Error::Config(
                        "Cloud backend requires PINECONE_API_KEY".to_string(),
                    ));
                }
                if self.pinecone.host.as_deref().unwrap_or("").is_empty() {
                    return Err(Error::Config(
                        "Cloud backend requires PINECONE_HOST (the index data-plane host)"
                            .to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 10MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters (a single longer sentence may exceed it)
    pub chunk_size: usize,
    /// Overlap between chunks in characters, carried as `chunk_overlap / 6` words
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the model per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Index write configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Records per upsert request
    pub batch_size: usize,
    /// Concurrent embedding calls during upsert
    pub embed_concurrency: usize,
    /// Delete a file name's previous chunks before writing new ones
    pub replace_on_upload: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            embed_concurrency: 4,
            replace_on_upload: false,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding dimensions (768 for text-embedding-004 and nomic-embed-text)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

/// Gemini (Generative Language API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (usually from GEMINI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Embedding model
    pub embedding_model: String,
    /// Generation model
    pub generation_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            generation_model: "gemini-1.5-flash".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Pinecone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    /// API key (usually from PINECONE_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Index name
    pub index_name: String,
    /// Data-plane host of the index, e.g. "rightsteps-docs-abc123.svc.us-east-1.pinecone.io"
    pub host: Option<String>,
    /// Control-plane URL for index management
    pub control_plane_url: String,
    /// Serverless cloud for new indexes
    pub cloud: String,
    /// Serverless region for new indexes
    pub region: String,
    /// Similarity metric for new indexes
    pub metric: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: "rightsteps-docs".to_string(),
            host: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            metric: "cosine".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

/// Backend provider selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Local backend (Ollama + in-memory vector store)
    #[default]
    Local,
    /// Hosted services (Gemini + Pinecone)
    Cloud,
}
