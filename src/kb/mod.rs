// src/kb/mod.rs
//! Knowledge-base collaborator: topic catalog, formulas, questions and solution steps.
//!
//! The intent engine never touches this directly. The assistant asks a [`KnowledgeBase`]
//! for the topic list once per session (to build a `TopicCatalog` snapshot) and for
//! display records after an intent has been resolved.

pub mod cache;
pub mod file;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::{Topic, TopicId};
use crate::intent::QuestionId;

pub use cache::CachedKnowledgeBase;
pub use file::FileKnowledgeBase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub description: String,
}

/// A question joined with its topic name, as shown by "list all questions".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionListing {
    pub id: QuestionId,
    pub description: String,
    pub topic_name: String,
}

/// Read-only lookups. Implementations may fail (unreachable source, bad data); a
/// missing record is `Ok(None)` or an empty list, not an error.
pub trait KnowledgeBase {
    /// All topics in catalog order.
    fn topics(&self) -> Result<Vec<Topic>>;
    /// Exact-name topic lookup.
    fn topic_by_name(&self, name: &str) -> Result<Option<Topic>>;
    fn formulas_for_topic(&self, topic_id: TopicId) -> Result<Vec<String>>;
    fn questions_for_topic(&self, topic_id: TopicId) -> Result<Vec<Question>>;
    /// Every question, ordered by topic name and then question id.
    fn all_questions(&self) -> Result<Vec<QuestionListing>>;
    fn question(&self, id: QuestionId) -> Result<Option<Question>>;
    /// Solution steps in display order.
    fn steps_for_question(&self, id: QuestionId) -> Result<Vec<String>>;
}
