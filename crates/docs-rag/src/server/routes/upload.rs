//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// POST /api/upload - Upload a .md or .txt file as multipart field `file`
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let result = handle_upload(&state, multipart).await;
    if let Err(e) = &result {
        super::log_failure("Upload", e);
    }
    result.map(Json)
}

async fn handle_upload(state: &AppState, mut multipart: Multipart) -> Result<UploadResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file: {}", e)))?;

        tracing::info!("Received file: {} ({} bytes)", file_name, data.len());

        return state
            .pipeline()
            .upload(&file_name, content_type.as_deref(), &data)
            .await;
    }

    Err(Error::validation("No file uploaded"))
}
