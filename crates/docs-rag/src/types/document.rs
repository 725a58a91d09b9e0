//! Document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Supported upload types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Markdown file
    Markdown,
    /// Plain text file
    Txt,
}

impl FileType {
    /// Detect file type from extension (case-sensitive, `md` or `txt` only)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" => Some(Self::Markdown),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Detect file type from a MIME content type (parameters such as charset are ignored)
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "text/markdown" => Some(Self::Markdown),
            "text/plain" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Detect an upload's type: the declared content type wins, then the extension.
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        content_type
            .and_then(Self::from_content_type)
            .or_else(|| {
                Path::new(filename)
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(Self::from_extension)
            })
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Markdown => "Markdown",
            Self::Txt => "Text File",
        }
    }
}

/// An uploaded document. Only its chunks outlive the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// File name as uploaded; identifies the document in the index
    pub file_name: String,
    /// File type
    pub file_type: FileType,
    /// UTF-8 text content
    pub content: String,
    /// Upload size in bytes
    pub size_bytes: u64,
}

impl Document {
    /// Validate an upload and decode its text.
    ///
    /// Fails with [`Error::Validation`] for anything that is not Markdown or
    /// plain text, and for bytes that are not valid UTF-8.
    pub fn from_upload(file_name: &str, content_type: Option<&str>, data: &[u8]) -> Result<Self> {
        let file_type = FileType::detect(file_name, content_type).ok_or_else(|| {
            Error::validation("Unsupported file type. Please upload .md or .txt files.")
        })?;

        let content = std::str::from_utf8(data)
            .map_err(|e| Error::validation(format!("File '{}' is not valid UTF-8: {}", file_name, e)))?;
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(content).to_string();

        Ok(Self {
            file_name: file_name.to_string(),
            file_type,
            content,
            size_bytes: data.len() as u64,
        })
    }
}

/// A sentence-aligned slice of a document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed chunk text
    pub text: String,
    /// Accumulated size in characters as counted by the chunker
    pub size: usize,
    /// Zero-based position within the document
    pub chunk_index: u32,
}

impl Chunk {
    /// Deterministic record id: `{file_name}_chunk_{chunk_index}`
    pub fn record_id(&self, file_name: &str) -> String {
        chunk_id(file_name, self.chunk_index)
    }
}

/// Record id for a document's chunk. Re-uploading a file name overwrites ids.
pub fn chunk_id(file_name: &str, chunk_index: u32) -> String {
    format!("{}_chunk_{}", file_name, chunk_index)
}

/// Metadata stored with every index record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Chunk text (the index is the only durable copy)
    pub text: String,
    /// Owning document's file name
    pub file_name: String,
    /// Position within the document
    #[serde(deserialize_with = "lenient_u32")]
    pub chunk_index: u32,
    /// Chunk size in characters
    #[serde(deserialize_with = "lenient_usize")]
    pub size: usize,
    /// Upload time (RFC 3339)
    pub uploaded_at: DateTime<Utc>,
}

impl ChunkMetadata {
    /// Build metadata for a chunk of `file_name` uploaded at `uploaded_at`
    pub fn for_chunk(chunk: &Chunk, file_name: &str, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            text: chunk.text.clone(),
            file_name: file_name.to_string(),
            chunk_index: chunk.chunk_index,
            size: chunk.size,
            uploaded_at,
        }
    }
}

// Pinecone hands numeric metadata back as floats ("chunkIndex": 2.0).
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {}",
            value
        )));
    }
    Ok(value)
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    if value > u32::MAX as f64 {
        return Err(serde::de::Error::custom("chunk index out of range"));
    }
    Ok(value as u32)
}

fn lenient_usize<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_f64(deserializer).map(|v| v as usize)
}
