//! docs-rag: Document Q&A with retrieval-augmented generation
//!
//! Uploaded text documents are split into overlapping, sentence-aligned chunks,
//! embedded, and stored in a vector index. Questions are answered by retrieving
//! the closest chunks and handing them, together with the question, to a
//! generative model. A document mode skips retrieval and sends the whole
//! document instead.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::RagPipeline;
pub use types::{
    document::{Chunk, ChunkMetadata, Document, FileType},
    query::ExplainRequest,
    response::{AnswerResponse, RetrievalResult, SourceRef, UploadResponse},
};
