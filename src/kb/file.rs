// src/kb/file.rs
//! In-memory knowledge base loaded from a TOML or JSON document.
//!
//! Document shape (TOML shown, JSON mirrors it):
//!
//! ```toml
//! [[topics]]
//! id = 1
//! name = "Fungsi"
//! formulas = ["f(x) = ax + b"]
//!
//! [[questions]]
//! id = 1
//! topic_id = 1
//! description = "Given f(x) = 2x + 3, find f(4)."
//! steps = ["Substitute x = 4", "f(4) = 11"]
//! ```
//!
//! Path resolution for [`FileKnowledgeBase::load_default`]:
//! 1) `$ADDMATHS_KB_PATH`
//! 2) `config/knowledge_base.toml`
//! 3) `config/knowledge_base.json`

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{KnowledgeBase, Question, QuestionListing};
use crate::catalog::{Topic, TopicId};
use crate::intent::QuestionId;

pub const ENV_KB_PATH: &str = "ADDMATHS_KB_PATH";
pub const DEFAULT_KB_TOML: &str = "config/knowledge_base.toml";
pub const DEFAULT_KB_JSON: &str = "config/knowledge_base.json";

#[derive(Debug, Clone, Deserialize)]
struct TopicRecord {
    id: TopicId,
    name: String,
    #[serde(default)]
    formulas: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionRecord {
    id: QuestionId,
    topic_id: TopicId,
    description: String,
    #[serde(default)]
    steps: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct KbDocument {
    #[serde(default)]
    topics: Vec<TopicRecord>,
    #[serde(default)]
    questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct FileKnowledgeBase {
    topics: Vec<TopicRecord>,
    questions: Vec<QuestionRecord>,
}

impl FileKnowledgeBase {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let doc: KbDocument = toml::from_str(s).context("parsing knowledge base TOML")?;
        Self::from_document(doc)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let doc: KbDocument = serde_json::from_str(s).context("parsing knowledge base JSON")?;
        Self::from_document(doc)
    }

    /// Load from an explicit path; the extension picks the format (`.json` or TOML).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading knowledge base from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let kb = match ext.as_str() {
            "json" => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
        .with_context(|| format!("loading {}", path.display()))?;
        info!(
            path = %path.display(),
            topics = kb.topics.len(),
            questions = kb.questions.len(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    /// Load using the env var, then the default config paths.
    pub fn load_default() -> Result<Self> {
        Self::load_from(&default_path()?)
    }

    fn from_document(doc: KbDocument) -> Result<Self> {
        let mut topic_ids = HashSet::new();
        for t in &doc.topics {
            if !topic_ids.insert(t.id) {
                bail!("duplicate topic id {}", t.id);
            }
        }
        let mut question_ids = HashSet::new();
        for q in &doc.questions {
            if !question_ids.insert(q.id) {
                bail!("duplicate question id {}", q.id);
            }
            if !topic_ids.contains(&q.topic_id) {
                bail!("question {} references unknown topic {}", q.id, q.topic_id);
            }
        }
        Ok(Self {
            topics: doc.topics,
            questions: doc.questions,
        })
    }

    fn topic_name(&self, id: TopicId) -> Option<&str> {
        self.topics
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }
}

/// Resolve the knowledge base path: env var first (must exist), then TOML, then JSON.
pub fn default_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(ENV_KB_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        return Err(anyhow!("{ENV_KB_PATH} points to non-existent path"));
    }
    [DEFAULT_KB_TOML, DEFAULT_KB_JSON]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| anyhow!("no knowledge base found (set {ENV_KB_PATH} or add {DEFAULT_KB_TOML})"))
}

fn to_question(q: &QuestionRecord) -> Question {
    Question {
        id: q.id,
        topic_id: q.topic_id,
        description: q.description.clone(),
    }
}

impl KnowledgeBase for FileKnowledgeBase {
    fn topics(&self) -> Result<Vec<Topic>> {
        Ok(self
            .topics
            .iter()
            .map(|t| Topic {
                id: t.id,
                name: t.name.clone(),
            })
            .collect())
    }

    fn topic_by_name(&self, name: &str) -> Result<Option<Topic>> {
        Ok(self.topics.iter().find(|t| t.name == name).map(|t| Topic {
            id: t.id,
            name: t.name.clone(),
        }))
    }

    fn formulas_for_topic(&self, topic_id: TopicId) -> Result<Vec<String>> {
        Ok(self
            .topics
            .iter()
            .find(|t| t.id == topic_id)
            .map(|t| t.formulas.clone())
            .unwrap_or_default())
    }

    fn questions_for_topic(&self, topic_id: TopicId) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.topic_id == topic_id)
            .map(to_question)
            .collect())
    }

    fn all_questions(&self) -> Result<Vec<QuestionListing>> {
        let mut out: Vec<QuestionListing> = self
            .questions
            .iter()
            .filter_map(|q| {
                let topic_name = self.topic_name(q.topic_id)?;
                Some(QuestionListing {
                    id: q.id,
                    description: q.description.clone(),
                    topic_name: topic_name.to_string(),
                })
            })
            .collect();
        out.sort_by(|a, b| a.topic_name.cmp(&b.topic_name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn question(&self, id: QuestionId) -> Result<Option<Question>> {
        Ok(self.questions.iter().find(|q| q.id == id).map(to_question))
    }

    fn steps_for_question(&self, id: QuestionId) -> Result<Vec<String>> {
        Ok(self
            .questions
            .iter()
            .find(|q| q.id == id)
            .map(|q| q.steps.clone())
            .unwrap_or_default())
    }
}
