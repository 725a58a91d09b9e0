//! Vector index gateway: embeds chunk and query texts and talks to the store

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::config::IndexingConfig;
use crate::error::{Error, Result};
use crate::providers::{
    EmbeddingProvider, IndexRecord, MetadataFilter, StoreStats, VectorStoreProvider,
};
use crate::types::{Chunk, ChunkMetadata, RetrievalResult};

/// Gateway over an embedding provider and a vector store
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    /// Records per upsert request
    batch_size: usize,
    /// Concurrent embedding calls during upsert
    embed_concurrency: usize,
}

impl VectorIndex {
    /// Create a gateway with default batching (100 records, 4 concurrent embeds)
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self::with_config(embedder, store, &IndexingConfig::default())
    }

    /// Create a gateway with explicit indexing settings
    pub fn with_config(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        config: &IndexingConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            batch_size: config.batch_size.max(1),
            embed_concurrency: config.embed_concurrency.max(1),
        }
    }

    /// Embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Vector store
    pub fn store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.store
    }

    /// Embed and write a document's chunks under `{file_name}_chunk_{i}` ids.
    ///
    /// Returns the number of records written. Existing records with the same
    /// ids are overwritten. Batches sent before a failure stay written.
    pub async fn upsert(&self, chunks: &[Chunk], file_name: &str) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let uploaded_at = Utc::now();

        // Owned texts keep the upload future Send for axum handlers
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings: Vec<Vec<f32>> = stream::iter(texts)
            .map(|text| async move { self.embed(&text).await })
            .buffered(self.embed_concurrency)
            .try_collect()
            .await
            .map_err(|e| Error::IndexWrite(e.to_string()))?;

        let records: Vec<IndexRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| IndexRecord {
                id: chunk.record_id(file_name),
                values,
                metadata: ChunkMetadata::for_chunk(chunk, file_name, uploaded_at),
            })
            .collect();

        let total = records.len();
        let mut records = records.into_iter();
        let mut written = 0;

        loop {
            let batch: Vec<IndexRecord> = records.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                break;
            }
            let batch_len = batch.len();

            self.store
                .upsert(batch)
                .await
                .map_err(|e| Error::IndexWrite(e.to_string()))?;

            written += batch_len;
            tracing::debug!(
                "Upserted {}/{} records for {} into {}",
                written,
                total,
                file_name,
                self.store.name()
            );
        }

        Ok(written)
    }

    /// Embed `query_text` and return the `top_k` closest chunks, best first.
    ///
    /// With `file_filter`, only chunks of that file name are considered.
    pub async fn query(
        &self,
        query_text: &str,
        top_k: usize,
        file_filter: Option<&str>,
    ) -> Result<Vec<RetrievalResult>> {
        let vector = self
            .embed(query_text)
            .await
            .map_err(|e| Error::IndexQuery(e.to_string()))?;

        let filter = file_filter.map(|name| MetadataFilter::FileName(name.to_string()));
        let matches = self
            .store
            .query(&vector, top_k, filter.as_ref())
            .await
            .map_err(|e| Error::IndexQuery(e.to_string()))?;

        let mut results = Vec::with_capacity(matches.len());
        for m in matches {
            let Some(raw) = m.metadata else {
                tracing::warn!("Skipping match {} without metadata", m.id);
                continue;
            };
            match serde_json::from_value::<ChunkMetadata>(raw) {
                // Cosine can go negative or drift past 1.0 in float math
                Ok(metadata) => results.push(RetrievalResult::from_metadata(
                    m.id,
                    m.score.clamp(0.0, 1.0),
                    metadata,
                )),
                Err(e) => tracing::warn!("Skipping match {} with unreadable metadata: {}", m.id, e),
            }
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(results)
    }

    /// Delete every chunk stored for `file_name`. Deleting an unknown file is a no-op.
    pub async fn delete_by_file_name(&self, file_name: &str) -> Result<()> {
        self.store
            .delete_many(&MetadataFilter::FileName(file_name.to_string()))
            .await
            .map_err(|e| Error::IndexDelete(e.to_string()))
    }

    /// Index statistics from the store
    pub async fn stats(&self) -> Result<StoreStats> {
        self.store.describe().await
    }

    /// Embed one text and check the vector length
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text).await?;
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(Error::embedding(format!(
                "{} returned {} dimensions, expected {}",
                self.embedder.name(),
                vector.len(),
                expected
            )));
        }
        Ok(vector)
    }
}
