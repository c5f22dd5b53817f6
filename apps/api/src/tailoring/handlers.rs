//! Axum route handlers for the Tailoring API.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::normalize::normalize;
use crate::extraction::{Extractor, Strategy};
use crate::state::AppState;
use crate::tailoring::ats::{keyword_report, KeywordReport};
use crate::tailoring::generator::tailor_resume;

/// Job text shorter than this is almost certainly a failed extraction
/// (login wall, cookie banner, empty shell page).
pub const MIN_JOB_TEXT_CHARS: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    /// Job posting text. Takes precedence over `html`.
    pub job_text: Option<String>,
    /// Raw page HTML to extract the posting from.
    pub html: Option<String>,
    /// Résumé to tailor. Falls back to the stored résumé.
    pub resume_text: Option<String>,
}

/// Where the job text came from.
#[derive(Debug, Clone, Serialize)]
pub struct JobSource {
    /// `None` when the caller supplied `job_text` directly.
    pub strategy: Option<Strategy>,
    pub selector: Option<String>,
    pub char_count: usize,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub tailored_resume: String,
    pub ats_score: u8,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub keyword_report: KeywordReport,
    pub job_source: JobSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tailor
///
/// Resolves job text (given or extracted) and the résumé (given or stored),
/// then runs one tailoring round trip and a keyword cross-check.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let resume_text = match non_blank(request.resume_text) {
        Some(text) => text,
        None => state
            .resumes
            .load()
            .await?
            .map(|stored| stored.resume_text)
            .ok_or_else(|| {
                AppError::Validation(
                    "No resume provided and none saved. Save a resume first.".to_string(),
                )
            })?,
    };

    let (job_text, job_source) =
        resolve_job_text(state.extractor.clone(), request.job_text, request.html).await?;

    if job_source.char_count < MIN_JOB_TEXT_CHARS {
        return Err(AppError::UnprocessableEntity(format!(
            "Job description too short ({} chars, need at least {MIN_JOB_TEXT_CHARS}). \
             Open the full posting and try again.",
            job_source.char_count
        )));
    }

    let tailored = tailor_resume(
        state.completion.as_ref(),
        &resume_text,
        &job_text,
        state.extractor.max_chars(),
    )
    .await?;

    let keyword_report = keyword_report(&tailored.tailored_resume, &job_text);

    Ok(Json(TailorResponse {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        tailored_resume: tailored.tailored_resume,
        ats_score: tailored.ats_score,
        matched_keywords: tailored.matched_keywords,
        missing_keywords: tailored.missing_keywords,
        suggestions: tailored.suggestions,
        keyword_report,
        job_source,
    }))
}

/// Normalizes supplied job text, or extracts it from HTML on the blocking pool.
async fn resolve_job_text(
    extractor: Arc<Extractor>,
    job_text: Option<String>,
    html: Option<String>,
) -> Result<(String, JobSource), AppError> {
    if let Some(text) = non_blank(job_text) {
        let text = normalize(&text);
        let source = JobSource {
            strategy: None,
            selector: None,
            char_count: text.chars().count(),
        };
        return Ok((text, source));
    }

    let html = non_blank(html)
        .ok_or_else(|| AppError::Validation("Either job_text or html is required".to_string()))?;

    let extraction = tokio::task::spawn_blocking(move || extractor.extract_html(&html))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))?;

    let source = JobSource {
        strategy: Some(extraction.strategy),
        selector: extraction.selector.clone(),
        char_count: extraction.char_count(),
    };
    Ok((extraction.text, source))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
