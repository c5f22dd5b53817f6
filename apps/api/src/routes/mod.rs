pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route("/api/v1/extract", post(extraction::handle_extract))
        // Resume API
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume)
                .put(resume::handle_save_resume)
                .delete(resume::handle_clear_resume),
        )
        // Tailoring API
        .route("/api/v1/tailor", post(tailoring::handle_tailor))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::DEFAULT_MAX_BODY_BYTES;
    use crate::extraction::Extractor;
    use crate::llm_client::{CompletionBackend, LlmError};
    use crate::resume::store::ResumeStore;

    /// Always answers with the same canned reply.
    struct FixedBackend(&'static str);

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    const REPLY: &str = r#"Sure! {"tailored_resume": "Jane Doe\nRust engineer building Tokio services",
        "ats_score": "88%", "matched_keywords": ["Rust", "Tokio"], "missing_keywords": [],
        "suggestions": [],}"#;

    fn app(dir: &tempfile::TempDir) -> Router {
        build_router(
            AppState {
                completion: Arc::new(FixedBackend(REPLY)),
                extractor: Arc::new(Extractor::default()),
                resumes: ResumeStore::new(dir.path().join("resume.txt")),
            },
            DEFAULT_MAX_BODY_BYTES,
        )
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn posting_html() -> String {
        let paragraph = "We are hiring a backend engineer to build Rust and Tokio services. ";
        format!(
            "<html><body><nav>Jobs</nav><div id='jobDescriptionText'><p>{}</p></div></body></html>",
            paragraph.repeat(5)
        )
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(&dir), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            Method::POST,
            "/api/v1/extract",
            json!({ "html": posting_html() }),
        );
        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strategy"], "selector");
        assert_eq!(body["selector"], "#jobDescriptionText");
        assert!(body["text"].as_str().unwrap().starts_with("We are hiring"));
    }

    #[tokio::test]
    async fn test_extract_accepts_pages_over_two_megabytes() {
        let dir = tempfile::tempdir().unwrap();
        let related = "<div class='card'><a href='/jobs/42'>Related role</a></div>".repeat(45_000);
        let html = format!("{}{related}", posting_html());
        assert!(html.len() > 2 * 1024 * 1024);

        let request = json_request(Method::POST, "/api/v1/extract", json!({ "html": html }));
        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strategy"], "selector");
    }

    #[tokio::test]
    async fn test_body_limit_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(
            AppState {
                completion: Arc::new(FixedBackend(REPLY)),
                extractor: Arc::new(Extractor::default()),
                resumes: ResumeStore::new(dir.path().join("resume.txt")),
            },
            1024,
        );
        let request = json_request(
            Method::POST,
            "/api/v1/extract",
            json!({ "html": "<p>x</p>".repeat(500) }),
        );
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_extract_rejects_empty_html() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(Method::POST, "/api/v1/extract", json!({ "html": "  " }));
        let (status, body) = send(app(&dir), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_resume_lifecycle() {
        let dir = tempfile::tempdir().unwrap();

        let get = || Request::get("/api/v1/resume").body(Body::empty()).unwrap();
        let (status, _) = send(app(&dir), get()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let put = json_request(
            Method::PUT,
            "/api/v1/resume",
            json!({ "resume_text": "  Jane Doe\nRust engineer  " }),
        );
        let (status, body) = send(app(&dir), put).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_text"], "Jane Doe\nRust engineer");

        let (status, body) = send(app(&dir), get()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_text"], "Jane Doe\nRust engineer");

        let delete = Request::delete("/api/v1/resume").body(Body::empty()).unwrap();
        let (status, _) = send(app(&dir), delete).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(app(&dir), get()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_rejects_blank_resume() {
        let dir = tempfile::tempdir().unwrap();
        let put = json_request(Method::PUT, "/api/v1/resume", json!({ "resume_text": "\n" }));
        let (status, _) = send(app(&dir), put).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tailor_from_html_with_stored_resume() {
        let dir = tempfile::tempdir().unwrap();
        let put = json_request(
            Method::PUT,
            "/api/v1/resume",
            json!({ "resume_text": "Jane Doe\nRust engineer" }),
        );
        send(app(&dir), put).await;

        let request = json_request(
            Method::POST,
            "/api/v1/tailor",
            json!({ "html": posting_html() }),
        );
        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ats_score"], 88);
        assert_eq!(body["job_source"]["strategy"], "selector");
        assert!(body["keyword_report"]["score"].as_u64().unwrap() > 0);
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn test_tailor_without_resume_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            Method::POST,
            "/api/v1/tailor",
            json!({ "job_text": "Rust engineer. ".repeat(20) }),
        );
        let (status, _) = send(app(&dir), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tailor_rejects_short_job_text() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            Method::POST,
            "/api/v1/tailor",
            json!({ "job_text": "Sign in to continue", "resume_text": "Jane Doe" }),
        );
        let (status, body) = send(app(&dir), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }
}
