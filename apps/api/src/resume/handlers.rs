//! Axum route handlers for the stored résumé.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::resume::store::StoredResume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub resume_text: String,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
) -> Result<Json<StoredResume>, AppError> {
    state
        .resumes
        .load()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No resume has been saved yet".to_string()))
}

/// PUT /api/v1/resume
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Json(request): Json<SaveResumeRequest>,
) -> Result<Json<StoredResume>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let stored = state.resumes.save(request.resume_text.trim()).await?;
    Ok(Json(stored))
}

/// DELETE /api/v1/resume
pub async fn handle_clear_resume(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.resumes.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
