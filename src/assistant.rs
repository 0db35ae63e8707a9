// src/assistant.rs
//! Session front-end: owns the cached knowledge base and the current catalog snapshot,
//! turns a raw query into an [`Understanding`] and renders the reply text.
//!
//! Provider failures never end the session; they are logged and rendered as an apology.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::TopicCatalog;
use crate::intent::{understand, IntentResult, QuestionId, ResolvedTopic, Understanding};
use crate::kb::{CachedKnowledgeBase, KnowledgeBase};
use crate::metrics::{record_intent, record_resolution};
use crate::telemetry::query_fingerprint;

const STEPS_HINT: &str = "To see steps for a question, type 'show steps for question #'";

const HELP_TEXT: &str = "\
==================================================
ADDMATHS EXPERT SYSTEM - COMMAND GUIDE
==================================================
You can use these commands or natural language queries:

1. TOPIC INFORMATION:
   - Just type a topic name (e.g., 'Fungsi', 'Janjang')
   - You'll get formulas and sample questions for that topic

2. LIST COMMANDS:
   - 'list topics' or 'show available topics'
   - 'list questions for [topic]' (e.g., 'list questions for Fungsi')
   - 'list all questions' or 'show all questions'

3. QUESTION SOLUTIONS:
   - 'show steps for question 5' or 'solution for q5'
   - 'how to solve question 12' or 'steps for #12'

4. OTHER COMMANDS:
   - 'help'   - Show this guide again
   - 'reload' - Clear caches and reload the topic list
   - 'stats'  - Show usage counters (when enabled)
   - 'exit'   - Quit the program
==================================================";

/// REPL-level commands; anything else is a query for the intent engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    /// Clear caches and fetch a fresh topic catalog.
    Reload,
    /// Print metrics.
    Stats,
    Query(String),
}

impl Command {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "exit" | "quit" => Command::Exit,
            "help" => Command::Help,
            "reload" => Command::Reload,
            "stats" => Command::Stats,
            _ => Command::Query(trimmed.to_string()),
        }
    }
}

pub fn help_text() -> &'static str {
    HELP_TEXT
}

/// Rendered answer plus the structured result it was built from.
#[derive(Debug, Clone)]
pub struct Reply {
    pub understanding: Understanding,
    pub text: String,
}

pub struct Assistant<K> {
    kb: CachedKnowledgeBase<K>,
    catalog: Arc<TopicCatalog>,
}

impl<K: KnowledgeBase> Assistant<K> {
    /// Wrap `kb` in a cache and take the initial catalog snapshot.
    pub fn new(kb: K) -> Result<Self> {
        let kb = CachedKnowledgeBase::new(kb);
        let catalog = Arc::new(fetch_catalog(&kb)?);
        info!(topics = catalog.topics().len(), "topic catalog ready");
        Ok(Self { kb, catalog })
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<TopicCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn knowledge_base(&self) -> &CachedKnowledgeBase<K> {
        &self.kb
    }

    /// Clear every cache and publish a fresh catalog snapshot. On failure the previous
    /// snapshot stays in place.
    pub fn reload(&mut self) -> Result<()> {
        self.kb.clear();
        let fresh = fetch_catalog(&self.kb)?;
        info!(topics = fresh.topics().len(), "topic catalog reloaded");
        self.catalog = Arc::new(fresh);
        Ok(())
    }

    pub fn respond(&self, raw_query: &str) -> Reply {
        let catalog = self.catalog();
        let understanding = understand(raw_query, &catalog);

        record_intent(&understanding.intent);
        if matches!(
            understanding.intent,
            IntentResult::ListQuestionsForTopic { .. } | IntentResult::ShowTopicInfo
        ) {
            record_resolution(understanding.topic.as_ref());
        }
        debug!(
            id = %query_fingerprint(&understanding.normalized),
            intent = %understanding.intent,
            topic = ?understanding.topic.as_ref().map(|t| t.topic_id),
            "query understood"
        );

        let text = match self.render(&understanding, &catalog) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = ?e, intent = %understanding.intent, "knowledge base lookup failed");
                "Sorry, something went wrong while looking that up. Please try again.".to_string()
            }
        };
        Reply {
            understanding,
            text,
        }
    }

    fn render(&self, u: &Understanding, catalog: &TopicCatalog) -> Result<String> {
        match &u.intent {
            IntentResult::ListAllQuestions => self.render_all_questions(),
            IntentResult::ListTopics => Ok(render_topics(catalog)),
            IntentResult::ShowSteps { question_id } => self.render_steps(*question_id),
            IntentResult::ListQuestionsForTopic { topic_phrase } => {
                self.render_topic_questions(topic_phrase, u.topic.as_ref())
            }
            IntentResult::ShowTopicInfo => self.render_topic_info(u.topic.as_ref()),
        }
    }

    fn render_all_questions(&self) -> Result<String> {
        let all = self.kb.all_questions()?;
        if all.is_empty() {
            return Ok("No questions available in the knowledge base.".to_string());
        }
        let mut s = String::new();
        writeln!(s, "All Available Questions:")?;
        writeln!(s, "=======================")?;
        let mut current_topic: Option<&str> = None;
        for q in &all {
            if current_topic != Some(q.topic_name.as_str()) {
                current_topic = Some(q.topic_name.as_str());
                writeln!(s)?;
                writeln!(s, "[{}]", q.topic_name)?;
            }
            writeln!(s, "ID: {} - {}", q.id, q.description)?;
        }
        writeln!(s)?;
        write!(s, "To see steps for any question, ask 'show steps for question #'")?;
        Ok(s)
    }

    fn render_steps(&self, question_id: Option<QuestionId>) -> Result<String> {
        let Some(id) = question_id else {
            return Ok("I couldn't identify which question you're asking about. \
                       Please include a question number."
                .to_string());
        };
        let Some(question) = self.kb.question(id)? else {
            return Ok(format!("Question with ID {id} not found."));
        };
        let steps = self.kb.steps_for_question(id)?;

        let mut s = String::new();
        write!(s, "Question {id}: {}", question.description)?;
        if steps.is_empty() {
            write!(s, "\nNo steps available for this question.")?;
        } else {
            write!(s, "\nSteps:")?;
            for (i, step) in steps.iter().enumerate() {
                write!(s, "\n{}. {}", i + 1, step)?;
            }
        }
        Ok(s)
    }

    fn render_topic_questions(
        &self,
        phrase: &str,
        topic: Option<&ResolvedTopic>,
    ) -> Result<String> {
        let Some(topic) = topic else {
            return Ok(format!(
                "I couldn't find the topic '{phrase}'. Please try another topic."
            ));
        };
        let questions = self.kb.questions_for_topic(topic.topic_id)?;

        let header = format!("Questions for {}:", topic.name);
        let mut s = String::new();
        writeln!(s, "{header}")?;
        write!(s, "{}", "-".repeat(header.chars().count()))?;
        if questions.is_empty() {
            write!(s, "\nNo questions available for this topic.")?;
            return Ok(s);
        }
        for q in &questions {
            write!(s, "\nID: {} - {}", q.id, q.description)?;
        }
        write!(s, "\n\n{STEPS_HINT}")?;
        Ok(s)
    }

    fn render_topic_info(&self, topic: Option<&ResolvedTopic>) -> Result<String> {
        let Some(resolved) = topic else {
            return Ok("I'm not sure what topic you're asking about.\n\
                       Type 'list topics' to see all available topics or 'help' for command assistance."
                .to_string());
        };
        let Some(details) = self.kb.topic_by_name(&resolved.name)? else {
            return Ok("Sorry, I couldn't find information about that topic.".to_string());
        };

        let header = format!("Topic: {}", details.name);
        let mut s = String::new();
        writeln!(s, "{header}")?;
        write!(s, "{}", "-".repeat(header.chars().count()))?;

        let formulas = self.kb.formulas_for_topic(details.id)?;
        if !formulas.is_empty() {
            write!(s, "\n\nFormulas:")?;
            for f in &formulas {
                write!(s, "\n- {f}")?;
            }
        }

        let questions = self.kb.questions_for_topic(details.id)?;
        if questions.is_empty() {
            write!(s, "\n\nNo questions available for this topic.")?;
        } else {
            write!(s, "\n\nSample Questions:")?;
            for q in &questions {
                write!(s, "\nID: {} - {}", q.id, q.description)?;
            }
            write!(s, "\n\n{STEPS_HINT}")?;
        }
        Ok(s)
    }
}

fn fetch_catalog<K: KnowledgeBase>(kb: &K) -> Result<TopicCatalog> {
    let topics = kb.topics().context("fetching topic catalog")?;
    TopicCatalog::new(topics)
}

fn render_topics(catalog: &TopicCatalog) -> String {
    let mut s = String::from("Available Topics:\n----------------");
    for t in catalog.topics() {
        s.push_str("\n- ");
        s.push_str(&t.name);
    }
    s.push_str("\n\nFor information on a topic, just type its name.");
    s.push_str("\nTo see questions for a topic, type 'list questions for [topic name]'");
    s
}
