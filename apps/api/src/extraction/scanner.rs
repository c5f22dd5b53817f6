//! Heuristic block scanner.
//!
//! Scores every visible content container by the length of its normalized
//! visible text. Containers with many direct block children are layout
//! wrappers whose length is just the sum of unrelated sections, so they are
//! rejected before scoring. Containers inside page furniture (navigation,
//! footers, sidebars, forms) are rejected too.
//!
//! One rendering pass over the document supplies every candidate's text,
//! so cost stays linear in the number of elements however deep they nest.

use std::collections::HashSet;

use scraper::ElementRef;

use crate::extraction::document::{is_block_tag, PageDocument};
use crate::extraction::normalize::normalize;
use crate::extraction::visibility::Visibility;

/// Element kinds considered as prose containers.
const CANDIDATE_TAGS: &[&str] = &["div", "section", "article", "main"];

/// Page furniture. Nothing inside these is a candidate.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "nav", "footer",
    "aside", "form",
];

/// ARIA landmark roles equivalent to the non-content tags above.
const NON_CONTENT_ROLES: &[&str] = &["navigation", "contentinfo", "complementary", "form", "search"];

/// One scored container from a scan.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: ElementRef<'a>,
    pub text: String,
    pub len: usize,
}

/// Returns the highest-scoring candidate, whatever its length.
/// Ties keep the first candidate in pre-order.
pub fn scan_blocks<'a, V: Visibility>(
    doc: &'a PageDocument<V>,
    wrapper_child_limit: usize,
) -> Option<Candidate<'a>> {
    // Pre-order, so a parent is always decided before its children.
    let mut furniture = HashSet::new();
    for element in doc.elements() {
        let inherited = element
            .parent()
            .is_some_and(|parent| furniture.contains(&parent.id()));
        if inherited || is_non_content(element) {
            furniture.insert(element.id());
        }
    }

    // Elements are reported children first, so ties resolve on `order`.
    let mut best: Option<(usize, Candidate<'a>)> = None;

    doc.render_document(|block| {
        let element = block.element;
        if block.hidden || !CANDIDATE_TAGS.contains(&element.value().name()) {
            return;
        }
        if furniture.contains(&element.id())
            || direct_block_children(element) > wrapper_child_limit
        {
            return;
        }
        // Normalizing never lengthens text.
        if best.as_ref().is_some_and(|(_, b)| block.text.len() < b.len) {
            return;
        }

        let text = normalize(block.text);
        let len = text.chars().count();
        let wins = match &best {
            None => true,
            Some((order, b)) => len > b.len || (len == b.len && block.order < *order),
        };
        if wins {
            best = Some((block.order, Candidate { element, text, len }));
        }
    });

    best.map(|(_, candidate)| candidate)
}

fn is_non_content(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if NON_CONTENT_TAGS.contains(&el.name()) {
        return true;
    }
    el.attr("role")
        .and_then(|role| role.split_whitespace().next())
        .map(|role| NON_CONTENT_ROLES.contains(&role.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn direct_block_children(element: ElementRef<'_>) -> usize {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| is_block_tag(child.value().name()))
        .count()
}
