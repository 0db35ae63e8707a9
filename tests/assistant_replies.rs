// tests/assistant_replies.rs
// Rendered replies for each intent, cache reuse, reload and provider failures.
// Uses an inline TOML knowledge base.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use addmaths_expert::kb::{Question, QuestionListing};
use addmaths_expert::{Assistant, FileKnowledgeBase, IntentResult, KnowledgeBase, Topic, TopicId};
use anyhow::{anyhow, Result};

const KB_TOML: &str = r#"
[[topics]]
id = 1
name = "Fungsi"
formulas = ["fg(x) = f(g(x))"]

[[topics]]
id = 2
name = "Janjang"

[[questions]]
id = 1
topic_id = 1
description = "Find fg(2)."
steps = ["g(2) = 4", "f(4) = 11"]

[[questions]]
id = 2
topic_id = 2
description = "Find T10 of 3, 7, 11, ..."
"#;

fn kb() -> FileKnowledgeBase {
    FileKnowledgeBase::from_toml_str(KB_TOML).expect("inline kb")
}

fn assistant() -> Assistant<FileKnowledgeBase> {
    Assistant::new(kb()).expect("assistant")
}

#[test]
fn list_topics_uses_original_names() {
    let r = assistant().respond("List   Topics");
    assert_eq!(r.understanding.intent, IntentResult::ListTopics);
    assert!(r.text.contains("- Fungsi"));
    assert!(r.text.contains("- Janjang"));
}

#[test]
fn list_all_questions_grouped_by_topic() {
    let r = assistant().respond("show all questions");
    let fungsi = r.text.find("[Fungsi]").expect("Fungsi header");
    let janjang = r.text.find("[Janjang]").expect("Janjang header");
    assert!(fungsi < janjang);
    assert!(r.text.contains("ID: 1 - Find fg(2)."));
}

#[test]
fn steps_found_missing_and_empty() {
    let a = assistant();

    let r = a.respond("how to solve question 1");
    assert!(r.text.starts_with("Question 1: Find fg(2)."));
    assert!(r.text.contains("1. g(2) = 4"));
    assert!(r.text.contains("2. f(4) = 11"));

    let r = a.respond("steps for question 2");
    assert!(r.text.contains("No steps available for this question."));

    let r = a.respond("solution for q 42");
    assert_eq!(r.text, "Question with ID 42 not found.");
}

#[test]
fn questions_for_topic_found_and_not_found() {
    let a = assistant();

    let r = a.respond("list questions for JANJANG");
    assert!(r.text.starts_with("Questions for Janjang:"));
    assert!(r.text.contains("ID: 2 - Find T10"));

    let r = a.respond("questions on trigonometry");
    assert_eq!(
        r.text,
        "I couldn't find the topic 'trigonometry'. Please try another topic."
    );
}

#[test]
fn topic_info_via_sentence() {
    let r = assistant().respond("tell me about fungsi please");
    assert_eq!(r.understanding.intent, IntentResult::ShowTopicInfo);
    assert!(r.text.starts_with("Topic: Fungsi"));
    assert!(r.text.contains("- fg(x) = f(g(x))"));
    assert!(r.text.contains("Sample Questions:"));
}

#[test]
fn topic_info_without_match() {
    let r = assistant().respond("hello");
    assert!(r.text.starts_with("I'm not sure what topic you're asking about."));
    assert!(r.understanding.topic.is_none());
}

#[test]
fn repeated_queries_are_served_from_cache() {
    let a = assistant();
    a.respond("fungsi");
    let after_first = a.knowledge_base().cached_entries();
    assert!(after_first > 0);
    a.respond("fungsi");
    assert_eq!(a.knowledge_base().cached_entries(), after_first);
}

#[test]
fn cache_stays_bounded_under_many_distinct_ids() {
    use addmaths_expert::kb::cache::QUESTION_CAP;

    let a = assistant();
    for i in 0..5000u64 {
        let id = 100 + i;
        let r = a.respond(&format!("steps for question {id}"));
        assert_eq!(r.text, format!("Question with ID {id} not found."));
    }
    // One catalog snapshot entry plus a full question table; unknown ids never
    // reach the steps lookup.
    assert_eq!(a.knowledge_base().cached_entries(), 1 + QUESTION_CAP);
}

/// Wraps the file KB; every lookup fails while `failing` is set.
struct FlakyKb {
    inner: FileKnowledgeBase,
    failing: AtomicBool,
    topic_calls: AtomicUsize,
}

impl FlakyKb {
    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("database unreachable"));
        }
        Ok(())
    }
}

impl KnowledgeBase for FlakyKb {
    fn topics(&self) -> Result<Vec<Topic>> {
        self.topic_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.topics()
    }
    fn topic_by_name(&self, name: &str) -> Result<Option<Topic>> {
        self.check()?;
        self.inner.topic_by_name(name)
    }
    fn formulas_for_topic(&self, topic_id: TopicId) -> Result<Vec<String>> {
        self.check()?;
        self.inner.formulas_for_topic(topic_id)
    }
    fn questions_for_topic(&self, topic_id: TopicId) -> Result<Vec<Question>> {
        self.check()?;
        self.inner.questions_for_topic(topic_id)
    }
    fn all_questions(&self) -> Result<Vec<QuestionListing>> {
        self.check()?;
        self.inner.all_questions()
    }
    fn question(&self, id: u64) -> Result<Option<Question>> {
        self.check()?;
        self.inner.question(id)
    }
    fn steps_for_question(&self, id: u64) -> Result<Vec<String>> {
        self.check()?;
        self.inner.steps_for_question(id)
    }
}

#[test]
fn provider_failure_is_rendered_and_reload_keeps_snapshot() {
    let mut a = Assistant::new(FlakyKb {
        inner: kb(),
        failing: AtomicBool::new(false),
        topic_calls: AtomicUsize::new(0),
    })
    .expect("assistant");

    a.knowledge_base().inner().failing.store(true, Ordering::SeqCst);

    let r = a.respond("list all questions");
    assert!(r.text.starts_with("Sorry, something went wrong"));

    // Catalog-only intents still work from the snapshot.
    let r = a.respond("list topics");
    assert!(r.text.contains("- Janjang"));

    assert!(a.reload().is_err());
    assert_eq!(a.catalog().topics().len(), 2);

    a.knowledge_base().inner().failing.store(false, Ordering::SeqCst);
    a.reload().expect("reload after recovery");
    assert_eq!(
        a.knowledge_base().inner().topic_calls.load(Ordering::SeqCst),
        3
    );
    assert!(a.respond("list all questions").text.contains("[Fungsi]"));
}
