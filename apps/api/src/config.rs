use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::{
    ExtractionConfig, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS, DEFAULT_WRAPPER_CHILD_LIMIT,
};

const DEFAULT_RESUME_PATH: &str = "data/resume.txt";

/// Request bodies carry whole page DOMs, well past axum's 2 MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub resume_path: PathBuf,
    pub max_body_bytes: usize,
    pub extraction: ExtractionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            resume_path: std::env::var("RESUME_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESUME_PATH)),
            max_body_bytes: parse_env("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            extraction: ExtractionConfig {
                min_chars: parse_env("EXTRACT_MIN_CHARS", DEFAULT_MIN_CHARS)?,
                max_chars: parse_env("EXTRACT_MAX_CHARS", DEFAULT_MAX_CHARS)?,
                wrapper_child_limit: parse_env(
                    "EXTRACT_WRAPPER_CHILD_LIMIT",
                    DEFAULT_WRAPPER_CHILD_LIMIT,
                )?,
                ..ExtractionConfig::default()
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
