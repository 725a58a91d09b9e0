//! Core types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{chunk_id, Chunk, ChunkMetadata, Document, FileType};
pub use query::ExplainRequest;
pub use response::{AnswerResponse, RetrievalResult, SourceRef, UploadResponse};
