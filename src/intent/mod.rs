// src/intent/mod.rs
//! Query understanding: normalize -> classify -> (question id | topic resolution).
//!
//! Everything under this module is synchronous and pure over its inputs: a query
//! string and a read-only [`TopicCatalog`] snapshot. No-match is always `None`.

pub mod classify;
pub mod extract;
pub mod fuzzy;
pub mod normalize;
pub mod resolve;

use serde::Serialize;

use crate::catalog::TopicCatalog;

pub use classify::{classify, IntentResult};
pub use extract::{extract_question_id, QuestionId};
pub use fuzzy::{fuzzy_match, token_sort_ratio, MatchResult, MATCH_THRESHOLD};
pub use normalize::normalize;
pub use resolve::{match_topic_phrase, resolve_topic, MatchSource, ResolvedTopic};

/// Outcome of running the full pipeline over one raw query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Understanding {
    pub normalized: String,
    pub intent: IntentResult,
    /// Set for topic-bearing intents when a catalog topic was found.
    pub topic: Option<ResolvedTopic>,
}

/// Run normalize + classify, then resolve the topic the intent refers to.
///
/// - `ListQuestionsForTopic`: the captured phrase is matched directly (no window search).
/// - `ShowTopicInfo`: the whole query goes through [`resolve_topic`], fallback included.
pub fn understand(raw_query: &str, catalog: &TopicCatalog) -> Understanding {
    let normalized = normalize(raw_query);
    let intent = classify(&normalized);
    let topic = match &intent {
        IntentResult::ListQuestionsForTopic { topic_phrase } => {
            match_topic_phrase(topic_phrase, catalog)
        }
        IntentResult::ShowTopicInfo => resolve_topic(&normalized, catalog),
        _ => None,
    };
    Understanding {
        normalized,
        intent,
        topic,
    }
}
