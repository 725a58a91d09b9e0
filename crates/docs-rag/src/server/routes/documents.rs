//! Document management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;

use crate::error::Result;
use crate::server::state::AppState;

/// DELETE /api/documents/:file_name - Delete every indexed chunk of a document
pub async fn delete_document(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if let Err(e) = state.pipeline().delete_document(&file_name).await {
        super::log_failure("Delete", &e);
        return Err(e);
    }

    Ok(Json(json!({
        "success": true,
        "file_name": file_name,
        "message": "Document chunks deleted",
    })))
}
