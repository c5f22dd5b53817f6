//! Single-résumé file store.
//!
//! One résumé string per deployment, kept in a local text file. Writes go
//! through a uniquely named temporary file and a rename, so readers never
//! see a half-written résumé.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredResume {
    pub resume_text: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResumeStore {
    path: PathBuf,
}

impl ResumeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the saved résumé, or `None` when nothing (or only whitespace) is stored.
    pub async fn load(&self) -> Result<Option<StoredResume>, StoreError> {
        let resume_text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if resume_text.trim().is_empty() {
            return Ok(None);
        }

        let metadata = fs::metadata(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        let updated_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(StoredResume {
            resume_text,
            updated_at,
        }))
    }

    /// Replaces the stored résumé.
    pub async fn save(&self, resume_text: &str) -> Result<StoredResume, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp_path = self.path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, resume_text)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                warn!("Failed to remove {}: {cleanup}", tmp_path.display());
            }
            return Err(StoreError::io(&self.path, e));
        }

        info!(
            "Saved resume ({} chars) to {}",
            resume_text.chars().count(),
            self.path.display()
        );

        Ok(StoredResume {
            resume_text: resume_text.to_string(),
            updated_at: Utc::now(),
        })
    }

    /// Deletes the stored résumé. Returns `false` when there was none.
    pub async fn clear(&self) -> Result<bool, StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Cleared resume at {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}
