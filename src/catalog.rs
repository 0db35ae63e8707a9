// src/catalog.rs
//! Immutable topic catalog snapshot plus the lowercase label index used for matching.
//!
//! A catalog is built once from the provider's topic list and then only read. When the
//! surrounding application refreshes topics it builds a new snapshot and swaps the
//! `Arc` (see `assistant::Assistant::reload`), it never edits one in place.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type TopicId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
}

/// `topic_id -> lowercase name`, in catalog order. Matching only; never displayed.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    entries: Vec<(TopicId, String)>,
}

impl LabelIndex {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (TopicId, String)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TopicId, &str)> {
        self.entries.iter().map(|(id, l)| (*id, l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
    labels: LabelIndex,
}

impl TopicCatalog {
    /// Build a snapshot. Fails if two topics share an id.
    pub fn new(topics: Vec<Topic>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(topics.len());
        for t in &topics {
            if !seen.insert(t.id) {
                bail!("duplicate topic id {} in catalog", t.id);
            }
        }
        let labels = LabelIndex::from_pairs(topics.iter().map(|t| (t.id, t.name.to_lowercase())));
        Ok(Self { topics, labels })
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Map a lowercase label back to its topic: first catalog entry whose lowercased
    /// name equals `label`.
    pub fn lookup_label(&self, label: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name.to_lowercase() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: TopicId, name: &str) -> Topic {
        Topic {
            id,
            name: name.into(),
        }
    }

    #[test]
    fn labels_are_lowercase_and_ordered() {
        let c = TopicCatalog::new(vec![topic(2, "Janjang"), topic(1, "Fungsi")]).unwrap();
        let labels: Vec<_> = c.labels().iter().collect();
        assert_eq!(labels, vec![(2, "janjang"), (1, "fungsi")]);
        assert_eq!(c.topics()[0].name, "Janjang");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = TopicCatalog::new(vec![topic(1, "Fungsi"), topic(1, "Janjang")]).unwrap_err();
        assert!(err.to_string().contains("duplicate topic id 1"));
    }

    #[test]
    fn lookup_restores_original_case() {
        let c = TopicCatalog::new(vec![topic(1, "Fungsi Kuadratik")]).unwrap();
        assert_eq!(c.lookup_label("fungsi kuadratik").map(|t| t.id), Some(1));
        assert!(c.lookup_label("Fungsi Kuadratik").is_none());
        assert!(c.lookup_label("janjang").is_none());
    }
}
