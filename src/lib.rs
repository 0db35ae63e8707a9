// src/lib.rs
// Public library surface for the REPL binary and integration tests.

pub mod catalog;
pub mod metrics;
pub mod telemetry;

// Query understanding core (normalize, extract, fuzzy, resolve, classify)
pub mod intent;

// Knowledge-base collaborator + explicit cache
pub mod kb;

// Session front-end: dispatch + rendering
pub mod assistant;

// ---- Re-exports for stable public API ----
pub use crate::assistant::{help_text, Assistant, Command, Reply};
pub use crate::catalog::{Topic, TopicCatalog, TopicId};
pub use crate::intent::{
    classify, extract_question_id, fuzzy_match, normalize, resolve_topic, understand,
    IntentResult, MatchResult, ResolvedTopic, Understanding,
};
pub use crate::kb::{CachedKnowledgeBase, FileKnowledgeBase, KnowledgeBase};
