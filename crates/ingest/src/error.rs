//! Error types produced by the ingest crate.
//!
//! All errors are typed, cloneable and comparable so callers (and tests) can
//! match on the exact rejection reason.
//!
//! | Error | Description |
//! |-------|-------------|
//! | [`MissingField`](IngestError::MissingField) | required field absent or blank |
//! | [`EmptyQuestionText`](IngestError::EmptyQuestionText) | stem blank after cleanup |
//! | [`TooFewOptions`](IngestError::TooFewOptions) / [`TooManyOptions`](IngestError::TooManyOptions) | option count outside config bounds |
//! | [`EmptyOption`](IngestError::EmptyOption) | an option has no text |
//! | [`CorrectOutOfRange`](IngestError::CorrectOutOfRange) | `correct` does not index an option |
//! | [`InvalidJson`](IngestError::InvalidJson) | record could not be parsed |
//! | [`InvalidConfig`](IngestError::InvalidConfig) | ingest configuration rejected |

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("question text empty after normalization")]
    EmptyQuestionText,

    #[error("question has {found} options; at least {min} required")]
    TooFewOptions { found: usize, min: usize },

    #[error("question has {found} options; at most {max} allowed")]
    TooManyOptions { found: usize, max: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("correct index {correct} out of range for {options} options")]
    CorrectOutOfRange { correct: i64, options: usize },

    #[error("invalid question json: {0}")]
    InvalidJson(String),

    #[error("invalid ingest config: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::InvalidJson(err.to_string())
    }
}
