use std::sync::Arc;

use crate::extraction::Extractor;
use crate::llm_client::CompletionBackend;
use crate::resume::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, a fake in tests.
    pub completion: Arc<dyn CompletionBackend>,
    /// Job-posting extractor with selectors parsed once at startup.
    pub extractor: Arc<Extractor>,
    pub resumes: ResumeStore,
}
