//! Keyword ATS cross-check: deterministic résumé vs job-posting overlap.
//!
//! Pure Rust, no LLM call. Gives the caller a second opinion next to the
//! model's own `ats_score`.
//!
//! Algorithm:
//! 1. Tokenize the job text, drop stop words, numbers and short tokens.
//! 2. Rank tokens by frequency (ties: first occurrence) and keep the top 25.
//! 3. A keyword matches when the résumé contains the same token.
//! 4. score = Σ frequency(matched) / Σ frequency(all) × 100

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

const MAX_KEYWORDS: usize = 25;
const MIN_TOKEN_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "all", "also", "and", "any", "apply", "are", "as", "at",
    "be", "been", "being", "benefits", "both", "but", "by", "can", "candidate", "candidates",
    "company", "could", "day", "days", "degree", "each", "equal", "etc", "every", "experience",
    "for", "from", "full", "good", "great", "has", "have", "help", "high", "how", "including",
    "into", "its", "job", "join", "just", "like", "looking", "make", "may", "more", "most", "must",
    "need", "new", "not", "off", "one", "only", "opportunity", "other", "our", "out", "over",
    "part", "per", "plus", "position", "preferred", "qualifications", "required", "requirements",
    "responsibilities", "role", "salary", "should", "skills", "some", "strong", "such", "team",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "time", "under", "using", "very", "want", "was", "way", "well", "were", "what",
    "when", "where", "which", "while", "who", "why", "will", "with", "within", "work", "working",
    "would", "year", "years", "you", "your",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordReport {
    pub score: u32, // 0 – 100
    pub matched: Vec<KeywordHit>,
    pub missing: Vec<KeywordHit>,
    pub recommendation: String,
}

/// Scores how well `resume_text` covers the most frequent job keywords.
pub fn keyword_report(resume_text: &str, job_text: &str) -> KeywordReport {
    let keywords = top_keywords(job_text, MAX_KEYWORDS);

    if keywords.is_empty() {
        return KeywordReport {
            score: 0,
            matched: vec![],
            missing: vec![],
            recommendation: "No keywords found in the job posting, cannot score fit.".to_string(),
        };
    }

    let resume_tokens: HashSet<String> = tokenize(resume_text).collect();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut total = 0u32;
    let mut covered = 0u32;

    for hit in keywords {
        total += hit.frequency;
        if resume_tokens.contains(&hit.keyword) {
            covered += hit.frequency;
            matched.push(hit);
        } else {
            missing.push(hit);
        }
    }

    let score = ((covered as f32 / total as f32) * 100.0).round() as u32;
    let recommendation = build_recommendation(score, &missing);

    KeywordReport {
        score,
        matched,
        missing,
        recommendation,
    }
}

/// Most frequent non-stop-word tokens, highest first.
fn top_keywords(text: &str, limit: usize) -> Vec<KeywordHit> {
    let mut counts: HashMap<String, (u32, usize)> = HashMap::new();

    for (position, token) in tokenize(text).enumerate() {
        if token.chars().count() < MIN_TOKEN_CHARS && !token.contains(['+', '#']) {
            continue;
        }
        if STOP_WORDS.contains(&token.as_str()) || token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        counts.entry(token).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, u32, usize)> = counts
        .into_iter()
        .map(|(keyword, (frequency, first_seen))| (keyword, frequency, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(keyword, frequency, _)| KeywordHit { keyword, frequency })
        .collect()
}

/// Lowercased word tokens. Keeps `+`, `#` and inner `.`/`-` so terms like
/// `c++`, `c#`, `node.js` and `ci-cd` survive.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-')))
        .map(|raw| raw.trim_matches(|c| c == '.' || c == '-'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// Builds a human-readable recommendation string from score and gaps.
fn build_recommendation(score: u32, missing: &[KeywordHit]) -> String {
    let top_gaps: Vec<&str> = missing.iter().take(3).map(|g| g.keyword.as_str()).collect();

    if score >= 80 {
        "Strong keyword coverage. Your resume already reflects the posting's main terms.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate keyword coverage ({score}/100). Consider surfacing: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low keyword coverage ({score}/100). Missing: {}. Only add them if your experience supports it.",
            top_gaps.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = "Senior Rust Engineer. You will build Rust services with Tokio and Axum. \
        Rust experience required. Kubernetes a plus. Tokio internals knowledge preferred.";

    #[test]
    fn test_tokenize_keeps_technical_terms() {
        let tokens: Vec<String> = tokenize("C++, C#, Node.js and CI-CD.").collect();
        assert_eq!(tokens, vec!["c++", "c#", "node.js", "and", "ci-cd"]);
    }

    #[test]
    fn test_top_keywords_ranked_by_frequency_then_position() {
        let keywords = top_keywords(JOB, 3);
        assert_eq!(keywords[0], KeywordHit { keyword: "rust".to_string(), frequency: 3 });
        assert_eq!(keywords[1].keyword, "tokio");
        assert_eq!(keywords[1].frequency, 2);
        // "senior" appears once and before every other single-use keyword
        assert_eq!(keywords[2].keyword, "senior");
    }

    #[test]
    fn test_stop_words_and_numbers_are_skipped() {
        let keywords = top_keywords("You will work with the team for 5 years 2024", 10);
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_full_coverage_scores_100() {
        let report = keyword_report(JOB, JOB);
        assert_eq!(report.score, 100);
        assert!(report.missing.is_empty());
        assert!(report.recommendation.contains("Strong"));
    }

    #[test]
    fn test_partial_coverage() {
        let resume = "Built Rust services on Tokio.";
        let report = keyword_report(resume, JOB);
        assert!(report.score > 0 && report.score < 100, "got {}", report.score);
        assert!(report.matched.iter().any(|k| k.keyword == "rust"));
        assert!(report.missing.iter().any(|k| k.keyword == "kubernetes"));
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let report = keyword_report("Pastry chef, croissants", JOB);
        assert_eq!(report.score, 0);
        assert!(report.matched.is_empty());
        assert!(report.recommendation.contains("Low keyword coverage"));
    }

    #[test]
    fn test_empty_job_text() {
        let report = keyword_report("anything", "");
        assert_eq!(report.score, 0);
        assert!(report.matched.is_empty() && report.missing.is_empty());
    }

    #[test]
    fn test_recommendation_moderate_lists_gaps() {
        let missing = vec![KeywordHit {
            keyword: "kafka".to_string(),
            frequency: 3,
        }];
        let rec = build_recommendation(65, &missing);
        assert!(rec.contains("kafka"));
        assert!(rec.contains("65"));
    }
}
