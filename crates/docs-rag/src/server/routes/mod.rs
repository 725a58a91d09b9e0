//! API routes for the RAG server

pub mod documents;
pub mod explain;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

use crate::error::Error;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for file uploads
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Explain / question
        .route("/explain", post(explain::explain))
        // Document management
        .route("/documents/:file_name", delete(documents::delete_document))
        // Info
        .route("/info", get(info))
}

/// Log a failed request at a level matching its cause
pub(crate) fn log_failure(route: &str, error: &Error) {
    match error {
        Error::Validation(_) | Error::NoRelevantContent => {
            tracing::warn!("{} rejected: {}", route, error)
        }
        _ => tracing::error!("{} failed: {}", route, error),
    }
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    let pipeline = state.pipeline();

    let index = match pipeline.index() {
        Some(index) => match index.stats().await {
            Ok(stats) => json!({
                "store": index.store().name(),
                "embedder": index.embedder().name(),
                "total_records": stats.total_records,
                "dimension": stats.dimension,
            }),
            Err(e) => json!({
                "store": index.store().name(),
                "embedder": index.embedder().name(),
                "error": e.to_string(),
            }),
        },
        None => serde_json::Value::Null,
    };

    Json(json!({
        "name": "docs-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A with retrieval-augmented generation",
        "backend": config.backend,
        "rag_enabled": pipeline.rag_enabled(),
        "llm": {
            "provider": state.llm_provider().name(),
            "model": pipeline.generator().model(),
        },
        "chunking": {
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap,
        },
        "top_k": config.retrieval.top_k,
        "index": index,
        "endpoints": {
            "POST /api/upload": "Upload a .md or .txt file (multipart field 'file')",
            "POST /api/explain": "Explain a document or answer a question",
            "DELETE /api/documents/:file_name": "Delete a document's indexed chunks",
            "GET /api/info": "Service information",
            "GET /health": "Liveness check",
            "GET /ready": "Provider health check"
        }
    }))
}
