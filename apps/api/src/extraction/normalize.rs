//! Whitespace normalization shared by every extraction path.

use std::sync::LazyLock;

use regex::Regex;

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalizes raw page text.
///
/// 1. `\r\n` and lone `\r` become `\n`
/// 2. tabs become a single space
/// 3. runs of 2+ spaces collapse to one
/// 4. runs of 3+ newlines collapse to exactly two
/// 5. leading/trailing whitespace is trimmed
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    let text = NEWLINE_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Cuts already-normalized text to at most `max_chars` characters.
/// Whitespace exposed at the cut is trimmed so the result stays normalized.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
