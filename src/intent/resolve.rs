// src/intent/resolve.rs
//! Topic resolution: direct fuzzy match, then a sliding-window search over the words of
//! the query for a topic mention embedded in a longer sentence.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::fuzzy::{fuzzy_match, MatchResult};
use super::normalize::normalize;
use crate::catalog::{TopicCatalog, TopicId};

/// Longest window (in words) tried by the fallback search.
pub const MAX_WINDOW: usize = 4;
/// Phrases of this many chars or fewer are skipped by the fallback search.
pub const MIN_PHRASE_CHARS: usize = 2;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w+\b").expect("word regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Direct,
    Window,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTopic {
    pub topic_id: TopicId,
    /// Original-case catalog name.
    pub name: String,
    pub score: u8,
    pub source: MatchSource,
}

/// Words of `text`, in order.
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Every contiguous run of 1..=`MAX_WINDOW` words, scanned by start index ascending and
/// then by length ascending. The scan order is the tie-break order of the fallback.
pub fn window_phrases(words: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for i in 0..words.len() {
        let end = (i + MAX_WINDOW).min(words.len());
        for j in (i + 1)..=end {
            out.push(words[i..j].join(" "));
        }
    }
    out
}

/// Best fallback match over all window phrases; equal scores keep the earliest phrase.
fn best_window_match(query: &str, catalog: &TopicCatalog) -> Option<MatchResult> {
    let words = tokenize(query);
    let mut best: Option<MatchResult> = None;
    for phrase in window_phrases(&words) {
        if phrase.chars().count() <= MIN_PHRASE_CHARS {
            continue;
        }
        if let Some(candidate) = fuzzy_match(&phrase, catalog.labels()) {
            let better = best.as_ref().map_or(true, |b| candidate.score > b.score);
            if better {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Fuzzy-match a phrase directly against the catalog (no window fallback) and map it
/// back to the original-case topic.
pub fn match_topic_phrase(phrase: &str, catalog: &TopicCatalog) -> Option<ResolvedTopic> {
    let hit = fuzzy_match(&normalize(phrase), catalog.labels())?;
    to_resolved(hit, MatchSource::Direct, catalog)
}

/// Resolve a free-text query to one catalog topic.
///
/// The whole normalized query is tried first; only if that finds nothing is the
/// sliding-window fallback run. Returns `None` when nothing clears the threshold or the
/// chosen label has no catalog entry.
pub fn resolve_topic(raw_query: &str, catalog: &TopicCatalog) -> Option<ResolvedTopic> {
    let query = normalize(raw_query);

    let (hit, source) = match fuzzy_match(&query, catalog.labels()) {
        Some(hit) => (hit, MatchSource::Direct),
        None => (best_window_match(&query, catalog)?, MatchSource::Window),
    };
    debug!(
        target: "intent",
        score = hit.score,
        source = ?source,
        "topic candidate chosen"
    );
    to_resolved(hit, source, catalog)
}

fn to_resolved(
    hit: MatchResult,
    source: MatchSource,
    catalog: &TopicCatalog,
) -> Option<ResolvedTopic> {
    let Some(topic) = catalog.lookup_label(&hit.matched_label) else {
        debug!(target: "intent", "matched label has no catalog entry");
        return None;
    };
    Some(ResolvedTopic {
        topic_id: topic.id,
        name: topic.name.clone(),
        score: hit.score,
        source,
    })
}
