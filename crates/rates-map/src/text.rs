//! Text normalization and keyword extraction.

use std::collections::BTreeSet;

use rates_model::CrosswalkEntry;

/// Tokens shorter than this never count as keywords.
pub const MIN_KEYWORD_LEN: usize = 3;

/// English function words plus catalog filler ("details", "stated", ...).
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "must", "can", "details",
    "stated", "including", "type",
];

/// Lowercases and collapses whitespace runs to single spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Word tokens of `text`, lowercased, without stopwords or short tokens.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN && !is_stopword(token))
        .map(str::to_string)
        .collect()
}

/// Keyword set of an entry's comma separated seed phrases.
///
/// Each phrase goes through [`extract_keywords`], so `"hot water, heater"`
/// yields `{heater, hot, water}`.
pub fn seed_keywords(entry: &CrosswalkEntry) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();
    for phrase in entry.seed_phrases() {
        keywords.extend(extract_keywords(phrase));
    }
    keywords
}

/// `|a ∩ b| / max(|a|, |b|)`, zero when either side is empty.
pub fn keyword_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / a.len().max(b.len()) as f64
}
