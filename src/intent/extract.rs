// src/intent/extract.rs
//! Question-id extraction.
//!
//! Patterns are tried in a fixed priority order and the first one that captures a
//! number wins. Keyword-qualified forms come first; a bare digit run is the last resort:
//!
//! | # | pattern            | example      |
//! |---|--------------------|--------------|
//! | 1 | `question\s+(\d+)` | "question 5" |
//! | 2 | `q\s*(\d+)`        | "q5", "q 5"  |
//! | 3 | `#\s*(\d+)`        | "#5", "# 5"  |
//! | 4 | `number\s+(\d+)`   | "number 5"   |
//! | 5 | `(\d+)`            | "5"          |
//!
//! So `"number 3 is question 7"` yields `7`: the `question` pattern outranks `number`
//! even though `number 3` appears first in the text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

pub type QuestionId = u64;

static ID_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("question", r"question\s+([0-9]+)"),
        ("q", r"q\s*([0-9]+)"),
        ("hash", r"#\s*([0-9]+)"),
        ("number", r"number\s+([0-9]+)"),
        ("bare", r"([0-9]+)"),
    ]
    .into_iter()
    .map(|(name, pat)| (name, Regex::new(pat).expect("question id regex")))
    .collect()
});

/// Extract a question id from `text` (expected to be normalized already).
///
/// Returns `None` when the text has no digits at all. A digit run too large for
/// [`QuestionId`] counts as no id.
pub fn extract_question_id(text: &str) -> Option<QuestionId> {
    for (name, re) in ID_PATTERNS.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let digits = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        match digits.parse::<QuestionId>() {
            Ok(id) => {
                trace!(target: "intent", pattern = *name, id, "question id extracted");
                return Some(id);
            }
            Err(_) => {
                trace!(target: "intent", pattern = *name, "digit run out of range");
                return None;
            }
        }
    }
    None
}
