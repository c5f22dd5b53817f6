//! Résumé tailoring: one LLM round trip that rewrites the résumé for a job
//! posting and scores it.
//!
//! Flow: cap job text → build prompt → complete_json (with JSON repair) →
//!       validate → retry once on unusable output.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::normalize::truncate_chars;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{complete_json, CompletionBackend, LlmError};
use crate::tailoring::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM};

/// Extra attempts when the model's reply cannot be used.
const MAX_TAILOR_RETRIES: u32 = 1;
const MAX_SUGGESTIONS: usize = 5;

/// The model's answer, after score coercion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoredResume {
    pub tailored_resume: String,
    /// 0 – 100. Accepts `78`, `78.4`, `"78"` or `"78%"` from the model.
    #[serde(deserialize_with = "deserialize_score")]
    pub ats_score: u8,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Tailors `resume_text` to `job_text`. Job text longer than `max_job_chars`
/// is cut before it reaches the prompt.
pub async fn tailor_resume(
    backend: &dyn CompletionBackend,
    resume_text: &str,
    job_text: &str,
    max_job_chars: usize,
) -> Result<TailoredResume, AppError> {
    let job_text = truncate_chars(job_text, max_job_chars);
    let prompt = build_tailor_prompt(resume_text, &job_text);

    for attempt in 0..=MAX_TAILOR_RETRIES {
        let problem = match complete_json::<TailoredResume>(backend, &prompt, TAILOR_SYSTEM).await {
            Ok(mut tailored) if !tailored.tailored_resume.trim().is_empty() => {
                tailored.suggestions.truncate(MAX_SUGGESTIONS);
                info!(
                    "Tailored resume: ats_score={}, matched={}, missing={}",
                    tailored.ats_score,
                    tailored.matched_keywords.len(),
                    tailored.missing_keywords.len()
                );
                return Ok(tailored);
            }
            Ok(_) => "empty tailored_resume".to_string(),
            Err(e @ (LlmError::Parse(_) | LlmError::EmptyContent)) => e.to_string(),
            Err(e) => return Err(AppError::Llm(format!("Tailoring LLM call failed: {e}"))),
        };

        warn!(
            "Tailoring attempt {}/{} returned unusable output ({problem}), retrying",
            attempt + 1,
            MAX_TAILOR_RETRIES + 1
        );
    }

    Err(AppError::Llm(format!(
        "Tailoring failed after {} attempts: the model did not return a usable resume",
        MAX_TAILOR_RETRIES + 1
    )))
}

fn build_tailor_prompt(resume_text: &str, job_text: &str) -> String {
    TAILOR_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{resume_text}", resume_text)
        .replace("{job_text}", job_text)
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    };
    raw.filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, 100.0) as u8)
        .ok_or_else(|| de::Error::custom(format!("invalid ats_score: {value}")))
}

/// `"85%"` → 85, `" 72/100"` → 72.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
