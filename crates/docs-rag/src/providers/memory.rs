//! In-memory vector store using cosine similarity
//!
//! Backs the local backend and the test suite. Every query scans all records,
//! so it is only suitable for small document sets.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::Result;

use super::vector_store::{IndexRecord, MetadataFilter, StoreMatch, StoreStats, VectorStoreProvider};

/// In-memory vector store keyed by record id
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<HashMap<String, IndexRecord>>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids currently stored, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<()> {
        let mut store = self.records.write();
        for record in records {
            store.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreMatch>> {
        let mut scored: Vec<(f32, &IndexRecord)> = Vec::new();
        let store = self.records.read();

        for record in store.values() {
            if filter.map_or(true, |f| f.matches(&record.metadata)) {
                scored.push((cosine_similarity(&record.values, vector), record));
            }
        }

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(score, record)| {
                Ok(StoreMatch {
                    id: record.id.clone(),
                    score,
                    metadata: Some(serde_json::to_value(&record.metadata)?),
                })
            })
            .collect()
    }

    async fn delete_many(&self, filter: &MetadataFilter) -> Result<()> {
        self.records
            .write()
            .retain(|_, record| !filter.matches(&record.metadata));
        Ok(())
    }

    async fn describe(&self) -> Result<StoreStats> {
        let store = self.records.read();
        Ok(StoreStats {
            total_records: store.len(),
            dimension: store.values().next().map(|r| r.values.len()),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;
    use chrono::Utc;

    fn record(id: &str, file_name: &str, values: Vec<f32>) -> IndexRecord {
        IndexRecord {
            id: id.to_string(),
            values,
            metadata: ChunkMetadata {
                text: format!("text of {}", id),
                file_name: file_name.to_string(),
                chunk_index: 0,
                size: 10,
                uploaded_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_orders_and_filters() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                record("a.md_chunk_0", "a.md", vec![1.0, 0.0]),
                record("a.md_chunk_1", "a.md", vec![0.6, 0.8]),
                record("b.md_chunk_0", "b.md", vec![0.9, 0.1]),
            ])
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a.md_chunk_0");
        assert_eq!(matches[1].id, "b.md_chunk_0");
        assert!(matches[0].metadata.is_some());

        let filter = MetadataFilter::FileName("a.md".to_string());
        let matches = store.query(&[1.0, 0.0], 5, Some(&filter)).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.id.starts_with("a.md")));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![record("a.md_chunk_0", "a.md", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(vec![record("a.md_chunk_0", "a.md", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        let matches = store.query(&[0.0, 1.0], 1, None).await.unwrap();
        assert!((matches[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_delete_many_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                record("a.md_chunk_0", "a.md", vec![1.0, 0.0]),
                record("b.md_chunk_0", "b.md", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let filter = MetadataFilter::FileName("a.md".to_string());
        store.delete_many(&filter).await.unwrap();
        store.delete_many(&filter).await.unwrap();

        assert_eq!(store.ids(), vec!["b.md_chunk_0".to_string()]);
        let stats = store.describe().await.unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.dimension, Some(2));
    }
}
