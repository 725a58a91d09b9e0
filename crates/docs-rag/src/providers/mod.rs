//! Provider abstractions for embeddings, LLM and vector storage
//!
//! This module provides trait-based abstractions that allow switching between
//! local (Ollama + in-memory) and cloud (Gemini + Pinecone) backends.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod pinecone;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiClient, GeminiEmbedder};
pub use llm::LlmProvider;
pub use memory::InMemoryVectorStore;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use pinecone::{CreateIndexOutcome, PineconeStore};
pub use vector_store::{IndexRecord, MetadataFilter, StoreMatch, StoreStats, VectorStoreProvider};
