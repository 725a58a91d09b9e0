//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;
use crate::types::ChunkMetadata;

/// A vector with its id and chunk metadata, as written to the store
#[derive(Debug, Clone)]
pub struct IndexRecord {
    /// Record id (`{file_name}_chunk_{chunk_index}`)
    pub id: String,
    /// Embedding values
    pub values: Vec<f32>,
    /// Chunk metadata stored alongside the vector
    pub metadata: ChunkMetadata,
}

/// A single similarity match returned by the store
#[derive(Debug, Clone)]
pub struct StoreMatch {
    /// Record id
    pub id: String,
    /// Similarity score (higher is more similar)
    pub score: f32,
    /// Raw metadata as stored; interpreted by the index gateway
    pub metadata: Option<serde_json::Value>,
}

/// Metadata filter for queries and bulk deletes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    /// Records whose `fileName` equals the value
    FileName(String),
}

impl MetadataFilter {
    /// Pinecone filter expression
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::FileName(name) => json!({ "fileName": { "$eq": name } }),
        }
    }

    /// Whether stored metadata satisfies the filter
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            Self::FileName(name) => metadata.file_name == *name,
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total records in the index
    pub total_records: usize,
    /// Vector dimension, when the store reports one
    pub dimension: Option<usize>,
}

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `PineconeStore`: Pinecone serverless index over REST
/// - `InMemoryVectorStore`: exhaustive cosine scan for local use and tests
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or overwrite records by id
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<()>;

    /// Return up to `top_k` matches by descending score, with metadata and without values
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreMatch>>;

    /// Delete every record matching the filter. Deleting nothing is not an error.
    async fn delete_many(&self, filter: &MetadataFilter) -> Result<()>;

    /// Describe the index
    async fn describe(&self) -> Result<StoreStats>;

    /// Get total number of vectors stored
    async fn len(&self) -> Result<usize> {
        Ok(self.describe().await?.total_records)
    }

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
