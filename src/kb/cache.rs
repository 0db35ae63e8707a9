// src/kb/cache.rs
//! Explicit lookup cache in front of any [`KnowledgeBase`].
//!
//! Each lookup has its own bounded memo table keyed by its argument. When a table is
//! full the least recently used entry is evicted, so ids typed by a user cannot grow
//! the cache without limit. Successful results (absent records included) stay cached
//! until evicted or until [`CachedKnowledgeBase::clear`]; errors are never cached, so a
//! transient provider failure is retried on the next call.

use anyhow::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use super::{KnowledgeBase, Question, QuestionListing};
use crate::catalog::{Topic, TopicId};
use crate::intent::QuestionId;
use crate::metrics::{record_cache, record_cache_eviction};

// Per-lookup capacities.
pub const TOPICS_CAP: usize = 32;
pub const TOPIC_BY_NAME_CAP: usize = 32;
pub const FORMULAS_CAP: usize = 32;
pub const QUESTIONS_FOR_TOPIC_CAP: usize = 32;
pub const ALL_QUESTIONS_CAP: usize = 128;
pub const QUESTION_CAP: usize = 32;
pub const STEPS_CAP: usize = 64;

#[derive(Debug)]
struct MemoState<K, V> {
    /// value + last-use tick
    entries: HashMap<K, (V, u64)>,
    tick: u64,
}

#[derive(Debug)]
struct Memo<K, V> {
    lookup: &'static str,
    cap: usize,
    state: Mutex<MemoState<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> Memo<K, V> {
    fn new(lookup: &'static str, cap: usize) -> Self {
        Self {
            lookup,
            cap: cap.max(1),
            state: Mutex::new(MemoState {
                entries: HashMap::with_capacity(cap.min(128)),
                tick: 0,
            }),
        }
    }

    fn get_or_try_load(&self, key: K, load: impl FnOnce() -> Result<V>) -> Result<V> {
        {
            let mut st = self.state.lock().expect("kb cache lock poisoned");
            st.tick += 1;
            let now = st.tick;
            if let Some((v, last_used)) = st.entries.get_mut(&key) {
                *last_used = now;
                record_cache(self.lookup, true);
                return Ok(v.clone());
            }
        }

        // Provider call happens outside the lock.
        record_cache(self.lookup, false);
        let v = load()?;

        let mut st = self.state.lock().expect("kb cache lock poisoned");
        if !st.entries.contains_key(&key) && st.entries.len() >= self.cap {
            let oldest = st
                .entries
                .iter()
                .min_by_key(|(_, (_, last_used))| *last_used)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                st.entries.remove(&k);
                record_cache_eviction(self.lookup);
            }
        }
        st.tick += 1;
        let now = st.tick;
        st.entries.insert(key, (v.clone(), now));
        Ok(v)
    }

    fn clear(&self) {
        let mut st = self.state.lock().expect("kb cache lock poisoned");
        st.entries.clear();
        st.tick = 0;
    }

    fn len(&self) -> usize {
        self.state.lock().expect("kb cache lock poisoned").entries.len()
    }
}

#[derive(Debug)]
pub struct CachedKnowledgeBase<K> {
    inner: K,
    topics: Memo<(), Vec<Topic>>,
    topic_by_name: Memo<String, Option<Topic>>,
    formulas: Memo<TopicId, Vec<String>>,
    questions_for_topic: Memo<TopicId, Vec<Question>>,
    all_questions: Memo<(), Vec<QuestionListing>>,
    question: Memo<QuestionId, Option<Question>>,
    steps: Memo<QuestionId, Vec<String>>,
}

impl<K: KnowledgeBase> CachedKnowledgeBase<K> {
    pub fn new(inner: K) -> Self {
        Self {
            inner,
            topics: Memo::new("topics", TOPICS_CAP),
            topic_by_name: Memo::new("topic_by_name", TOPIC_BY_NAME_CAP),
            formulas: Memo::new("formulas_for_topic", FORMULAS_CAP),
            questions_for_topic: Memo::new("questions_for_topic", QUESTIONS_FOR_TOPIC_CAP),
            all_questions: Memo::new("all_questions", ALL_QUESTIONS_CAP),
            question: Memo::new("question", QUESTION_CAP),
            steps: Memo::new("steps_for_question", STEPS_CAP),
        }
    }

    /// Drop every cached entry. The next lookups go to the provider again.
    pub fn clear(&self) {
        self.topics.clear();
        self.topic_by_name.clear();
        self.formulas.clear();
        self.questions_for_topic.clear();
        self.all_questions.clear();
        self.question.clear();
        self.steps.clear();
        tracing::info!("knowledge base caches cleared");
    }

    /// Total number of cached entries across all lookups.
    pub fn cached_entries(&self) -> usize {
        self.topics.len()
            + self.topic_by_name.len()
            + self.formulas.len()
            + self.questions_for_topic.len()
            + self.all_questions.len()
            + self.question.len()
            + self.steps.len()
    }

    pub fn inner(&self) -> &K {
        &self.inner
    }
}

impl<K: KnowledgeBase> KnowledgeBase for CachedKnowledgeBase<K> {
    fn topics(&self) -> Result<Vec<Topic>> {
        self.topics.get_or_try_load((), || self.inner.topics())
    }

    fn topic_by_name(&self, name: &str) -> Result<Option<Topic>> {
        self.topic_by_name
            .get_or_try_load(name.to_string(), || self.inner.topic_by_name(name))
    }

    fn formulas_for_topic(&self, topic_id: TopicId) -> Result<Vec<String>> {
        self.formulas
            .get_or_try_load(topic_id, || self.inner.formulas_for_topic(topic_id))
    }

    fn questions_for_topic(&self, topic_id: TopicId) -> Result<Vec<Question>> {
        self.questions_for_topic
            .get_or_try_load(topic_id, || self.inner.questions_for_topic(topic_id))
    }

    fn all_questions(&self) -> Result<Vec<QuestionListing>> {
        self.all_questions
            .get_or_try_load((), || self.inner.all_questions())
    }

    fn question(&self, id: QuestionId) -> Result<Option<Question>> {
        self.question.get_or_try_load(id, || self.inner.question(id))
    }

    fn steps_for_question(&self, id: QuestionId) -> Result<Vec<String>> {
        self.steps
            .get_or_try_load(id, || self.inner.steps_for_question(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts provider calls; can be switched into a failing mode.
    #[derive(Default)]
    struct CountingKb {
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingKb {
        fn hit(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("provider down"));
            }
            Ok(())
        }
    }

    impl KnowledgeBase for CountingKb {
        fn topics(&self) -> Result<Vec<Topic>> {
            self.hit()?;
            Ok(vec![Topic {
                id: 1,
                name: "Fungsi".into(),
            }])
        }
        fn topic_by_name(&self, _name: &str) -> Result<Option<Topic>> {
            self.hit()?;
            Ok(None)
        }
        fn formulas_for_topic(&self, topic_id: TopicId) -> Result<Vec<String>> {
            self.hit()?;
            Ok(vec![format!("formula for {topic_id}")])
        }
        fn questions_for_topic(&self, _topic_id: TopicId) -> Result<Vec<Question>> {
            self.hit()?;
            Ok(Vec::new())
        }
        fn all_questions(&self) -> Result<Vec<QuestionListing>> {
            self.hit()?;
            Ok(Vec::new())
        }
        fn question(&self, _id: QuestionId) -> Result<Option<Question>> {
            self.hit()?;
            Ok(None)
        }
        fn steps_for_question(&self, _id: QuestionId) -> Result<Vec<String>> {
            self.hit()?;
            Ok(Vec::new())
        }
    }

    fn calls(kb: &CachedKnowledgeBase<CountingKb>) -> usize {
        kb.inner().calls.load(Ordering::SeqCst)
    }

    #[test]
    fn repeated_lookups_hit_cache() {
        let kb = CachedKnowledgeBase::new(CountingKb::default());
        kb.topics().unwrap();
        kb.topics().unwrap();
        assert_eq!(calls(&kb), 1);

        assert_eq!(kb.formulas_for_topic(1).unwrap(), vec!["formula for 1"]);
        assert_eq!(kb.formulas_for_topic(2).unwrap(), vec!["formula for 2"]);
        kb.formulas_for_topic(1).unwrap();
        assert_eq!(calls(&kb), 3);
        assert_eq!(kb.cached_entries(), 3);
    }

    #[test]
    fn absent_records_are_cached_too() {
        let kb = CachedKnowledgeBase::new(CountingKb::default());
        assert_eq!(kb.question(5).unwrap(), None);
        assert_eq!(kb.question(5).unwrap(), None);
        assert_eq!(calls(&kb), 1);
    }

    #[test]
    fn clear_invalidates_everything() {
        let kb = CachedKnowledgeBase::new(CountingKb::default());
        kb.topics().unwrap();
        kb.steps_for_question(1).unwrap();
        kb.clear();
        assert_eq!(kb.cached_entries(), 0);
        kb.topics().unwrap();
        assert_eq!(calls(&kb), 3);
    }

    #[test]
    fn errors_are_not_cached() {
        let kb = CachedKnowledgeBase::new(CountingKb::default());
        kb.inner().failing.store(true, Ordering::SeqCst);
        assert!(kb.all_questions().is_err());
        kb.inner().failing.store(false, Ordering::SeqCst);
        assert!(kb.all_questions().unwrap().is_empty());
        kb.all_questions().unwrap();
        assert_eq!(calls(&kb), 2);
    }

    #[test]
    fn tables_are_bounded() {
        let kb = CachedKnowledgeBase::new(CountingKb::default());
        for id in 0..(QUESTION_CAP as u64 * 4) {
            kb.question(id).unwrap();
            kb.steps_for_question(id).unwrap();
        }
        assert_eq!(kb.cached_entries(), QUESTION_CAP + STEPS_CAP);
    }

    #[test]
    fn least_recently_used_is_evicted_first() {
        let kb = CachedKnowledgeBase::new(CountingKb::default());
        for id in 0..QUESTION_CAP as u64 {
            kb.question(id).unwrap();
        }
        // Touch id 0 so id 1 becomes the oldest entry.
        kb.question(0).unwrap();
        kb.question(1000).unwrap();
        let before = calls(&kb);

        kb.question(0).unwrap();
        assert_eq!(calls(&kb), before, "recently used entry must survive");
        kb.question(1).unwrap();
        assert_eq!(calls(&kb), before + 1, "oldest entry must be evicted");
    }
}
