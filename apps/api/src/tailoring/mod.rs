// Résumé tailoring: job text + résumé → tailored résumé, model ATS score and
// a deterministic keyword cross-check.
// All LLM calls go through llm_client; no direct API calls here.

pub mod ats;
pub mod generator;
pub mod handlers;
pub mod prompts;
