//! Targeted selector matcher: known job-posting containers, tried in priority order.

use scraper::Selector;

use crate::extraction::document::PageDocument;
use crate::extraction::normalize::normalize;
use crate::extraction::visibility::Visibility;
use crate::extraction::ExtractionError;

/// Job-board containers first, generic semantic containers last.
pub const DEFAULT_TARGET_SELECTORS: &[&str] = &[
    // Indeed
    "#jobDescriptionText",
    // LinkedIn
    ".jobs-description__content",
    ".jobs-description-content__text",
    ".jobs-box__html-content",
    ".show-more-less-html__markup",
    // Workday
    "[data-automation-id='jobPostingDescription']",
    // Greenhouse
    ".job__description",
    "#app_body #content",
    // Lever
    "[data-qa='job-description']",
    // Glassdoor
    "[class*='JobDetails_jobDescription']",
    // schema.org JobPosting markup
    "[itemprop='description']",
    // Common naming on company career pages
    "#job-details",
    "#job-description",
    ".job-description",
    "[class*='job-description']",
    "[class*='jobDescription']",
    "[id*='job-description']",
    "[id*='jobDescription']",
    // Generic semantic containers
    "article",
    "main",
    "[role='main']",
];

/// A parsed selector that remembers its source text for reporting.
#[derive(Debug, Clone)]
pub struct TargetSelector {
    source: String,
    selector: Selector,
}

impl TargetSelector {
    pub fn parse(source: &str) -> Result<Self, ExtractionError> {
        let selector = Selector::parse(source).map_err(|e| ExtractionError::InvalidSelector {
            selector: source.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }
}

/// Winning element of the targeted tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorMatch {
    pub selector: String,
    pub text: String,
}

/// Returns the first element, by selector priority then document order,
/// whose normalized visible text reaches `min_chars`.
pub fn match_targeted<V: Visibility>(
    doc: &PageDocument<V>,
    selectors: &[TargetSelector],
    min_chars: usize,
) -> Option<SelectorMatch> {
    for target in selectors {
        for element in doc.select(&target.selector) {
            let text = normalize(&doc.visible_text(element));
            if text.chars().count() >= min_chars {
                return Some(SelectorMatch {
                    selector: target.source.clone(),
                    text,
                });
            }
        }
    }
    None
}
