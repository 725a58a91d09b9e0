//! Explain / question endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AnswerResponse, ExplainRequest};

/// POST /api/explain - Explain a document or answer a question about it
pub async fn explain(
    State(state): State<AppState>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<AnswerResponse>> {
    tracing::info!(
        "Explain request (question: {}, file: {})",
        request.question_text().is_some(),
        request.file_filter().unwrap_or("any")
    );

    match state.pipeline().explain(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            super::log_failure("Explain", &e);
            Err(e)
        }
    }
}
