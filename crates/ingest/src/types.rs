//! Question record shapes.
//!
//! [`RawQuestion`] is what the question bank stores and what authors submit:
//! options arrive either as bare strings or as `{ "text": ... }` objects, and
//! category/difficulty may be strings or numbers. [`Question`] is the only
//! shape the rest of the workspace sees.
//!
//! ```text
//! RawQuestion                          Question
//! ├── id: String                       ├── id: String (trimmed)
//! ├── question: String                 ├── question: String (whitespace collapsed)
//! ├── options: [RawOption]      ──►    ├── options: [QuestionOption { text }]
//! ├── correct: i64                     ├── correct: usize (range checked)
//! ├── category_id: Option<Scalar>      ├── category_id: String
//! ├── difficulty: Option<Scalar>       ├── difficulty: String (default applied)
//! ├── image: Option<String>            ├── image: Option<String> (blank → None)
//! └── language: Option<String>         └── language: String (default applied)
//! ```

use serde::{Deserialize, Serialize};

/// One answer option as found in stored or submitted data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Text(String),
    Object { text: String },
}

impl RawOption {
    pub fn text(&self) -> &str {
        match self {
            RawOption::Text(text) | RawOption::Object { text } => text,
        }
    }
}

impl From<&str> for RawOption {
    fn from(value: &str) -> Self {
        RawOption::Text(value.to_string())
    }
}

/// A field that data sources encode either as a string or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Text(String),
    Number(i64),
}

impl RawScalar {
    pub fn into_string(self) -> String {
        match self {
            RawScalar::Text(text) => text,
            RawScalar::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for RawScalar {
    fn from(value: &str) -> Self {
        RawScalar::Text(value.to_string())
    }
}

/// Question as stored in the bank or submitted for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestion {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<RawOption>,
    pub correct: i64,
    #[serde(default)]
    pub category_id: Option<RawScalar>,
    #[serde(default)]
    pub difficulty: Option<RawScalar>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Canonical answer option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
}

impl QuestionOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Validated question record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub correct: usize,
    pub category_id: String,
    pub difficulty: String,
    #[serde(default)]
    pub image: Option<String>,
    pub language: String,
}

impl Question {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn option_texts(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.text.as_str())
    }

    /// The text of the correct option, if the index is in range.
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.get(self.correct)
    }
}
