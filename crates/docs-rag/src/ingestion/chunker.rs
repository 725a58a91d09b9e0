//! Sentence-aligned text chunking with word overlap

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Chunk;

/// Runs of sentence-ending punctuation
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// Average characters per word used to turn the overlap size into a word count
const CHARS_PER_WORD: usize = 6;

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks in characters
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Maximum chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of trailing words carried into the next chunk.
    ///
    /// This approximates the overlap in characters and is not checked against
    /// it. Existing indexes depend on the resulting boundaries, so keep it.
    pub fn overlap_words(&self) -> usize {
        self.overlap / CHARS_PER_WORD
    }

    /// Split text into chunks.
    ///
    /// Chunks break only between sentences. A sentence longer than the chunk
    /// size becomes its own oversized chunk. Every chunk after the first starts
    /// with the last [`overlap_words`](Self::overlap_words) words of the
    /// previous one.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current_chunk = String::new();
        let mut current_size = 0usize;

        for sentence in split_into_sentences(text) {
            let sentence_size = sentence.chars().count();

            if current_size + sentence_size > self.chunk_size && !current_chunk.is_empty() {
                chunks.push(Chunk {
                    text: current_chunk.trim().to_string(),
                    size: current_size,
                    chunk_index: chunks.len() as u32,
                });

                // Start new chunk with overlap
                let overlap_text = self.overlap_text(&current_chunk);
                current_chunk = if overlap_text.is_empty() {
                    sentence
                } else {
                    format!("{} {}", overlap_text, sentence)
                };
                current_size = current_chunk.chars().count();
            } else {
                if !current_chunk.is_empty() {
                    current_chunk.push(' ');
                }
                current_chunk.push_str(&sentence);
                // Joining space counted even for the first sentence
                current_size += sentence_size + 1;
            }
        }

        if !current_chunk.trim().is_empty() {
            chunks.push(Chunk {
                text: current_chunk.trim().to_string(),
                size: current_size,
                chunk_index: chunks.len() as u32,
            });
        }

        chunks
    }

    /// Last `overlap_words` space-separated words of a chunk buffer
    fn overlap_text(&self, buffer: &str) -> String {
        let count = self.overlap_words();
        if count == 0 {
            return String::new();
        }

        let words: Vec<&str> = buffer.split(' ').collect();
        let start = words.len().saturating_sub(count);
        words[start..].join(" ")
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

/// Split text into sentences on runs of `.`, `!` and `?`.
///
/// Blank pieces are dropped; each sentence is trimmed and re-terminated with a
/// single `.` whatever punctuation originally ended it.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}.", s))
        .collect()
}
