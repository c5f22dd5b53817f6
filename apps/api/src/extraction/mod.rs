// Job-posting text extraction.
// Three tiers, each tried only when the previous one finds nothing long enough:
// targeted selectors → heuristic block scan → truncated whole-document text.
// Extraction never fails; the weakest tier always returns something.

pub mod document;
pub mod handlers;
pub mod normalize;
pub mod scanner;
pub mod selectors;
pub mod visibility;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::extraction::document::PageDocument;
use crate::extraction::normalize::{normalize, truncate_chars};
use crate::extraction::scanner::scan_blocks;
use crate::extraction::selectors::{match_targeted, TargetSelector, DEFAULT_TARGET_SELECTORS};
use crate::extraction::visibility::Visibility;

pub const DEFAULT_MIN_CHARS: usize = 200;
pub const DEFAULT_MAX_CHARS: usize = 8000;
pub const DEFAULT_WRAPPER_CHILD_LIMIT: usize = 12;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Tunables for the extractor.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Normalized length a selector or heuristic hit must reach.
    pub min_chars: usize,
    /// Cap on last-resort output.
    pub max_chars: usize,
    /// Containers with more direct block children than this are wrappers.
    pub wrapper_child_limit: usize,
    /// Targeted selectors in priority order.
    pub selectors: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
            wrapper_child_limit: DEFAULT_WRAPPER_CHILD_LIMIT,
            selectors: DEFAULT_TARGET_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Which tier produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Selector,
    Heuristic,
    LastResort,
}

#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Normalized text. Empty only when the page has no visible text.
    pub text: String,
    pub strategy: Strategy,
    /// Selector that matched, for `Strategy::Selector`.
    pub selector: Option<String>,
}

impl Extraction {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: Vec<TargetSelector>,
    min_chars: usize,
    max_chars: usize,
    wrapper_child_limit: usize,
}

impl Extractor {
    /// Builds an extractor, parsing every configured selector up front.
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let selectors = config
            .selectors
            .iter()
            .map(|s| TargetSelector::parse(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            selectors,
            min_chars: config.min_chars,
            max_chars: config.max_chars,
            wrapper_child_limit: config.wrapper_child_limit,
        })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Parses `html` and extracts from it.
    pub fn extract_html(&self, html: &str) -> Extraction {
        let doc = PageDocument::parse(html);
        self.extract(&doc)
    }

    pub fn extract<V: Visibility>(&self, doc: &PageDocument<V>) -> Extraction {
        if let Some(hit) = match_targeted(doc, &self.selectors, self.min_chars) {
            debug!(
                "Extracted {} chars via selector '{}'",
                hit.text.chars().count(),
                hit.selector
            );
            return Extraction {
                text: hit.text,
                strategy: Strategy::Selector,
                selector: Some(hit.selector),
            };
        }

        if let Some(candidate) = scan_blocks(doc, self.wrapper_child_limit) {
            if candidate.len >= self.min_chars {
                debug!(
                    "Extracted {} chars via heuristic scan (<{}>)",
                    candidate.len,
                    candidate.element.value().name()
                );
                return Extraction {
                    text: candidate.text,
                    strategy: Strategy::Heuristic,
                    selector: None,
                };
            }
            debug!(
                "Best heuristic candidate has {} chars (< {}), using whole document",
                candidate.len, self.min_chars
            );
        }

        let text = truncate_chars(&normalize(&doc.document_text()), self.max_chars);
        debug!("Extracted {} chars via last resort", text.chars().count());
        Extraction {
            text,
            strategy: Strategy::LastResort,
            selector: None,
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_TARGET_SELECTORS
                .iter()
                .filter_map(|s| TargetSelector::parse(s).ok())
                .collect(),
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
            wrapper_child_limit: DEFAULT_WRAPPER_CHILD_LIMIT,
        }
    }
}
