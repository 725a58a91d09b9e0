//! Error types for the RAG system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad input: missing file or question, unsupported file type, bad encoding
    #[error("{0}")]
    Validation(String),

    /// Embedding service error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Raw vector store failure (mapped to an index error by the gateway)
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Upsert of chunk records failed
    #[error("Index write failed: {0}")]
    IndexWrite(String),

    /// Similarity query failed
    #[error("Index query failed: {0}")]
    IndexQuery(String),

    /// Deleting a document's records failed
    #[error("Index delete failed: {0}")]
    IndexDelete(String),

    /// Generative model error
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Retrieval worked but found nothing to answer from
    #[error("No relevant content found. Please upload a document first.")]
    NoRelevantContent,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Failure of one stage of the upload or question pipeline
    #[error("{stage}: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for failures of an external service (embedding, store, model)
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Embedding(_)
                | Error::VectorStore(_)
                | Error::IndexWrite(_)
                | Error::IndexQuery(_)
                | Error::IndexDelete(_)
                | Error::Generation(_)
                | Error::Http(_)
        ) || matches!(self, Error::Stage { source, .. } if source.is_upstream())
    }

    /// Attach the pipeline stage that failed.
    ///
    /// Validation, "no content" and configuration errors pass through untouched
    /// so the caller still sees what to fix.
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            Error::Validation(_) | Error::NoRelevantContent | Error::Config(_) | Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl Error {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::Embedding(_) => (StatusCode::BAD_GATEWAY, "embedding_error"),
            Error::VectorStore(_) => (StatusCode::BAD_GATEWAY, "vector_store_error"),
            Error::IndexWrite(_) => (StatusCode::BAD_GATEWAY, "index_write_error"),
            Error::IndexQuery(_) => (StatusCode::BAD_GATEWAY, "index_query_error"),
            Error::IndexDelete(_) => (StatusCode::BAD_GATEWAY, "index_delete_error"),
            Error::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
            Error::NoRelevantContent => (StatusCode::NOT_FOUND, "no_relevant_content"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            Error::Stage { source, .. } => source.status_and_type(),
        }
    }
}
