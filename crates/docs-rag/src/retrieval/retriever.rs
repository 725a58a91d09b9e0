//! Question-to-passages retrieval

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::RetrievalResult;

use super::VectorIndex;

/// Retrieves the passages most relevant to a question
pub struct Retriever {
    index: Arc<VectorIndex>,
    default_top_k: usize,
}

impl Retriever {
    /// Create a retriever returning `default_top_k` passages unless told otherwise
    pub fn new(index: Arc<VectorIndex>, default_top_k: usize) -> Self {
        Self {
            index,
            default_top_k: default_top_k.max(1),
        }
    }

    /// Underlying index gateway
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Find the `top_k` passages closest to `question`, best first.
    ///
    /// Fails with [`Error::NoRelevantContent`] when the index has nothing to
    /// offer, which is distinct from an upstream failure.
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: Option<usize>,
        file_filter: Option<&str>,
    ) -> Result<Vec<RetrievalResult>> {
        let top_k = top_k.filter(|k| *k > 0).unwrap_or(self.default_top_k);
        let results = self.index.query(question, top_k, file_filter).await?;

        if results.is_empty() {
            tracing::info!(
                "No chunks matched question (filter: {})",
                file_filter.unwrap_or("none")
            );
            return Err(Error::NoRelevantContent);
        }

        tracing::debug!(
            "Retrieved {} chunks, best score {:.3}",
            results.len(),
            results[0].score
        );
        Ok(results)
    }
}
