// src/intent/classify.rs
//! Intent classifier: a fixed, ordered rule table evaluated top to bottom.
//!
//! Rules (first match wins, no re-evaluation):
//! 1. `list_all_questions`: any "list everything" phrase
//! 2. `list_topics`: any topic-listing keyword
//! 3. `show_steps`: a solution keyword AND an extractable question id
//! 4. `list_questions_for_topic`: a topic-enumeration pattern; trailing phrase captured
//!
//! When nothing fires the result is `ShowTopicInfo` and the caller resolves the whole
//! query as a topic.
//!
//! Phrase checks are plain substring tests on the normalized query, so
//! "list all questions please" and "show me every problem" both hit rule 1.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::extract::{extract_question_id, QuestionId};

const LIST_ALL_PHRASES: &[&str] = &[
    "all questions",
    "every question",
    "list all questions",
    "show all questions",
    "all problems",
    "every problem",
    "all exercises",
];

const LIST_TOPIC_KEYWORDS: &[&str] = &[
    "list topic",
    "show topic",
    "all topic",
    "what topic",
    "available topic",
];

const SOLUTION_KEYWORDS: &[&str] = &["step", "solution", "solve", "how to"];

/// `(regex, capture group holding the topic phrase)`, tried in order.
static TOPIC_PATTERNS: Lazy<Vec<(Regex, usize)>> = Lazy::new(|| {
    [
        (
            r"(list|show|get|what|give)\s+.*(questions|problems|exercises).*(?:for|on|about|in)\s+(.+)",
            3,
        ),
        (r"questions\s+(?:for|on|about|in)\s+(.+)", 1),
        (r"problems\s+(?:for|on|about|in)\s+(.+)", 1),
    ]
    .into_iter()
    .map(|(pat, group)| (Regex::new(pat).expect("topic pattern regex"), group))
    .collect()
});

/// Classified purpose of a query. Exactly one variant per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum IntentResult {
    ListAllQuestions,
    ListTopics,
    ShowSteps { question_id: Option<QuestionId> },
    ListQuestionsForTopic { topic_phrase: String },
    ShowTopicInfo,
}

impl IntentResult {
    pub fn label(&self) -> &'static str {
        match self {
            IntentResult::ListAllQuestions => "list_all_questions",
            IntentResult::ListTopics => "list_topics",
            IntentResult::ShowSteps { .. } => "show_steps",
            IntentResult::ListQuestionsForTopic { .. } => "list_questions_for_topic",
            IntentResult::ShowTopicInfo => "show_topic_info",
        }
    }
}

impl fmt::Display for IntentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct IntentRule {
    name: &'static str,
    apply: fn(&str) -> Option<IntentResult>,
}

const RULES: &[IntentRule] = &[
    IntentRule {
        name: "list_all_questions",
        apply: rule_list_all,
    },
    IntentRule {
        name: "list_topics",
        apply: rule_list_topics,
    },
    IntentRule {
        name: "show_steps",
        apply: rule_show_steps,
    },
    IntentRule {
        name: "list_questions_for_topic",
        apply: rule_topic_questions,
    },
];

/// Classify an already-normalized query. Total: always returns one variant.
pub fn classify(normalized_query: &str) -> IntentResult {
    for rule in RULES {
        if let Some(intent) = (rule.apply)(normalized_query) {
            debug!(target: "intent", rule = rule.name, "intent rule fired");
            return intent;
        }
    }
    debug!(target: "intent", "no rule fired, defaulting to topic info");
    IntentResult::ShowTopicInfo
}

// --- rules ---

fn rule_list_all(q: &str) -> Option<IntentResult> {
    any_contains(q, LIST_ALL_PHRASES).then_some(IntentResult::ListAllQuestions)
}

fn rule_list_topics(q: &str) -> Option<IntentResult> {
    any_contains(q, LIST_TOPIC_KEYWORDS).then_some(IntentResult::ListTopics)
}

fn rule_show_steps(q: &str) -> Option<IntentResult> {
    if !any_contains(q, SOLUTION_KEYWORDS) {
        return None;
    }
    let id = extract_question_id(q)?;
    Some(IntentResult::ShowSteps {
        question_id: Some(id),
    })
}

fn rule_topic_questions(q: &str) -> Option<IntentResult> {
    TOPIC_PATTERNS.iter().find_map(|(re, group)| {
        let caps = re.captures(q)?;
        let phrase = caps.get(*group)?.as_str().trim();
        Some(IntentResult::ListQuestionsForTopic {
            topic_phrase: phrase.to_string(),
        })
    })
}

fn any_contains(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}
