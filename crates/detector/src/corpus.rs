//! Question corpus used to backfill fingerprints on first start.

use std::collections::BTreeMap;

use ingest::RawQuestion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorpusError {
    #[error("corpus unavailable: {0}")]
    Unavailable(String),
    #[error("topic {topic} could not be loaded: {message}")]
    Topic { topic: String, message: String },
}

/// Source of the existing question bank.
pub trait QuestionCorpus: Send + Sync {
    fn list_topics(&self) -> Result<Vec<Topic>, CorpusError>;

    /// Questions of `topic_id` as stored, before ingest validation.
    fn load_questions(&self, topic_id: &str) -> Result<Vec<RawQuestion>, CorpusError>;
}

/// Corpus held in memory, topics in id order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    topics: BTreeMap<String, (Topic, Vec<RawQuestion>)>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        questions: Vec<RawQuestion>,
    ) -> Self {
        let id = id.into();
        let topic = Topic {
            id: id.clone(),
            title: title.into(),
        };
        self.topics.insert(id, (topic, questions));
        self
    }

    /// Parses a JSON object of `topic id → [question, ...]`.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let parsed: BTreeMap<String, Vec<RawQuestion>> =
            serde_json::from_str(json).map_err(|e| CorpusError::Unavailable(e.to_string()))?;
        Ok(parsed
            .into_iter()
            .fold(Self::new(), |corpus, (id, questions)| {
                let title = id.clone();
                corpus.with_topic(id, title, questions)
            }))
    }

    pub fn question_count(&self) -> usize {
        self.topics.values().map(|(_, qs)| qs.len()).sum()
    }
}

impl QuestionCorpus for InMemoryCorpus {
    fn list_topics(&self) -> Result<Vec<Topic>, CorpusError> {
        Ok(self.topics.values().map(|(topic, _)| topic.clone()).collect())
    }

    fn load_questions(&self, topic_id: &str) -> Result<Vec<RawQuestion>, CorpusError> {
        self.topics
            .get(topic_id)
            .map(|(_, questions)| questions.clone())
            .ok_or_else(|| CorpusError::Topic {
                topic: topic_id.to_string(),
                message: "unknown topic".into(),
            })
    }
}
