mod config;
mod errors;
mod extraction;
mod llm_client;
mod resume;
mod routes;
mod state;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::Extractor;
use crate::llm_client::LlmClient;
use crate::resume::store::ResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize extractor (parses the selector list once)
    let extractor = Extractor::new(&config.extraction)?;
    info!(
        "Extractor ready: {} selectors, min {} chars, cap {} chars, wrapper limit {}",
        config.extraction.selectors.len(),
        config.extraction.min_chars,
        config.extraction.max_chars,
        config.extraction.wrapper_child_limit
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let resumes = ResumeStore::new(config.resume_path.clone());
    info!("Resume store at {}", resumes.path().display());

    // Build app state
    let state = AppState {
        completion: Arc::new(llm),
        extractor: Arc::new(extractor),
        resumes,
    };

    // Build router. The caller is a browser extension, so CORS stays open.
    let app = build_router(state, config.max_body_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
