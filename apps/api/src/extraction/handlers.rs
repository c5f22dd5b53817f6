//! Axum route handler for the Extraction API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::Strategy;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub strategy: Strategy,
    pub selector: Option<String>,
    pub char_count: usize,
}

/// POST /api/v1/extract
///
/// Extracts job-posting text from a page's HTML. Never fails on content:
/// weak pages come back through the last-resort strategy.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.html.trim().is_empty() {
        return Err(AppError::Validation("html cannot be empty".to_string()));
    }

    let extractor = state.extractor.clone();
    let extraction = tokio::task::spawn_blocking(move || extractor.extract_html(&request.html))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))?;

    Ok(Json(ExtractResponse {
        char_count: extraction.char_count(),
        text: extraction.text,
        strategy: extraction.strategy,
        selector: extraction.selector,
    }))
}
