//! Document ingestion: sentence splitting and overlapping chunks

mod chunker;

pub use chunker::{split_into_sentences, TextChunker};
