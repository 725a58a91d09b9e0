//! Response types for uploads and questions

use serde::{Deserialize, Serialize};

use super::document::ChunkMetadata;

/// One retrieved chunk, ranked by similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Record id in the index
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Source file name
    pub file_name: String,
    /// Chunk position within the source file
    pub chunk_index: u32,
    /// Similarity score clamped to 0.0-1.0, higher is more similar
    pub score: f32,
}

impl RetrievalResult {
    /// Build a result from a store match
    pub fn from_metadata(id: String, score: f32, metadata: ChunkMetadata) -> Self {
        Self {
            id,
            text: metadata.text,
            file_name: metadata.file_name,
            chunk_index: metadata.chunk_index,
            score,
        }
    }
}

/// A chunk that contributed to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source file name
    pub file_name: String,
    /// Chunk position within the file
    pub chunk_index: u32,
    /// Similarity score rounded to three decimals
    pub score: f32,
}

impl From<&RetrievalResult> for SourceRef {
    fn from(result: &RetrievalResult) -> Self {
        Self {
            file_name: result.file_name.clone(),
            chunk_index: result.chunk_index,
            score: round_score(result.score),
        }
    }
}

/// Round a similarity score to three decimals for display
pub fn round_score(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}

/// Response from an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always true; failures are returned as errors
    pub success: bool,
    /// Uploaded file name
    pub file_name: String,
    /// Upload size in bytes
    pub file_size: u64,
    /// Document-level summary from the model
    pub analysis: String,
    /// Original text (document mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    /// Chunks written to the index (RAG mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_stored: Option<usize>,
    /// Chunks produced by the chunker (RAG mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
    /// Whether the document was indexed for retrieval
    pub rag_enabled: bool,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Response from an explain / question request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Always true; failures are returned as errors
    pub success: bool,
    /// Generated answer or explanation
    pub explanation: String,
    /// True when a question was answered, false for a general explanation
    pub is_question: bool,
    /// Chunks used to build the prompt (RAG mode only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
