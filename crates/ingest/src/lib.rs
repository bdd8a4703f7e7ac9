//! Question ingest layer.
//!
//! This is where question records enter the duplicate-detection pipeline.
//! Stored bank data and author submissions come in loosely typed; everything
//! after this crate works on one canonical [`Question`] shape.
//!
//! ## What we do here
//!
//! - **Normalize option shape**: options arrive as bare strings or `{text}`
//!   objects; both become [`QuestionOption`].
//! - **Clean fields**: whitespace collapsed, control characters stripped,
//!   blank optional fields dropped.
//! - **Apply defaults**: language and difficulty from [`IngestConfig`].
//! - **Validate**: option bounds, non-empty option text, `correct` in range.
//! - **Log**: structured `tracing` events for every accept/reject.
//!
//! ## Example
//!
//! ```
//! use ingest::{ingest_question, IngestConfig, RawQuestion, RawOption};
//!
//! let raw = RawQuestion {
//!     id: " q-001 ".into(),
//!     question: "Which bone is the longest\nin the body?".into(),
//!     options: vec!["Femur".into(), RawOption::Object { text: "Tibia".into() }],
//!     correct: 0,
//!     category_id: Some("anatomy".into()),
//!     difficulty: None,
//!     image: None,
//!     language: None,
//! };
//!
//! let question = ingest_question(raw, &IngestConfig::default()).unwrap();
//! assert_eq!(question.id, "q-001");
//! assert_eq!(question.question, "Which bone is the longest in the body?");
//! assert_eq!(question.options[1].text, "Tibia");
//! assert_eq!(question.difficulty, "medium");
//! ```

use std::time::Instant;

use tracing::{debug, warn};

mod config;
mod error;
mod sanitize;
mod types;

use crate::sanitize::{sanitize_optional_string, sanitize_required_field};

pub use crate::config::IngestConfig;
pub use crate::error::IngestError;
pub use crate::types::{Question, QuestionOption, RawOption, RawQuestion, RawScalar};

/// Validate and normalize one raw question.
pub fn ingest_question(raw: RawQuestion, cfg: &IngestConfig) -> Result<Question, IngestError> {
    let start = Instant::now();
    let id_hint = raw.id.clone();

    match ingest_inner(raw, cfg) {
        Ok(question) => {
            debug!(
                question_id = %question.id,
                options = question.options.len(),
                language = %question.language,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_success"
            );
            Ok(question)
        }
        Err(err) => {
            warn!(
                question_id = %id_hint,
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_failure"
            );
            Err(err)
        }
    }
}

/// Parse a single JSON question record and ingest it.
pub fn ingest_json(json: &str, cfg: &IngestConfig) -> Result<Question, IngestError> {
    let raw: RawQuestion = serde_json::from_str(json)?;
    ingest_question(raw, cfg)
}

fn ingest_inner(raw: RawQuestion, cfg: &IngestConfig) -> Result<Question, IngestError> {
    let strip = cfg.strip_control_chars;
    let RawQuestion {
        id,
        question,
        options,
        correct,
        category_id,
        difficulty,
        image,
        language,
    } = raw;

    let id = sanitize_required_field("id", id, strip)?;
    let question = sanitize_optional_string(Some(question), strip)
        .ok_or(IngestError::EmptyQuestionText)?;

    if options.len() < cfg.min_options {
        return Err(IngestError::TooFewOptions {
            found: options.len(),
            min: cfg.min_options,
        });
    }
    if options.len() > cfg.max_options {
        return Err(IngestError::TooManyOptions {
            found: options.len(),
            max: cfg.max_options,
        });
    }

    let mut normalized_options = Vec::with_capacity(options.len());
    for (index, option) in options.into_iter().enumerate() {
        let text = match option {
            RawOption::Text(text) | RawOption::Object { text } => text,
        };
        let text = sanitize_optional_string(Some(text), strip)
            .ok_or(IngestError::EmptyOption { index })?;
        normalized_options.push(QuestionOption { text });
    }

    let correct = usize::try_from(correct)
        .ok()
        .filter(|idx| *idx < normalized_options.len())
        .ok_or(IngestError::CorrectOutOfRange {
            correct,
            options: normalized_options.len(),
        })?;

    let category_id = sanitize_optional_string(category_id.map(RawScalar::into_string), strip)
        .ok_or(IngestError::MissingField("category_id"))?;
    let difficulty = sanitize_optional_string(difficulty.map(RawScalar::into_string), strip)
        .map(|d| d.to_lowercase())
        .unwrap_or_else(|| cfg.default_difficulty.clone());
    let language = sanitize_optional_string(language, strip)
        .map(|l| l.to_lowercase())
        .unwrap_or_else(|| cfg.default_language.clone());
    let image = sanitize_optional_string(image, strip);

    Ok(Question {
        id,
        question,
        options: normalized_options,
        correct,
        category_id,
        difficulty,
        image,
        language,
    })
}
