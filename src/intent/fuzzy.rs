// src/intent/fuzzy.rs
//! Best-over-threshold fuzzy lookup against the lowercase label index.
//!
//! Similarity is a token-sort ratio: both strings are reduced to lowercase alphanumeric
//! tokens, the tokens are sorted and re-joined, and the two resulting strings are
//! compared with `strsim::normalized_levenshtein` (scaled to 0..=100, rounded).
//! Sorting makes the score insensitive to word order ("kuadratik fungsi" scores 100
//! against "fungsi kuadratik").
//!
//! This is not the indel-based ratio of fuzzywuzzy-style matchers
//! (`2 * lcs_len / total_len`). A substitution costs 1 here, and the distance is
//! normalized by the longer string, so scores run lower on near misses:
//! "functions" vs "fungsi" scores 44 here but about 53 under the indel ratio, which
//! puts it on the other side of [`MATCH_THRESHOLD`]. Pinned by
//! `tests::dissimilar_label_is_below_threshold`.

use serde::Serialize;
use strsim::normalized_levenshtein;
use tracing::trace;

use crate::catalog::LabelIndex;

/// A label must score strictly above this to be reported.
pub const MATCH_THRESHOLD: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched_label: String,
    pub score: u8,
}

/// Lowercase, replace every non-alphanumeric char by a space, then sort the tokens.
fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Word-order-insensitive similarity in `0..=100`. Empty input on either side scores 0.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let sim = normalized_levenshtein(&a, &b);
    (sim * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Score `query` against every label and return the best one above [`MATCH_THRESHOLD`].
///
/// A later label only replaces the current best when its score is strictly greater,
/// so equal scores keep the first label in index order. An empty index yields `None`.
pub fn fuzzy_match(query: &str, labels: &LabelIndex) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    let mut highest: u8 = 0;

    for (_, label) in labels.iter() {
        let score = token_sort_ratio(query, label);
        if score > highest && score > MATCH_THRESHOLD {
            highest = score;
            best = Some(MatchResult {
                matched_label: label.to_string(),
                score,
            });
        }
    }

    trace!(
        target: "intent",
        candidates = labels.len(),
        best_score = highest,
        matched = best.is_some(),
        "fuzzy match"
    );
    best
}
