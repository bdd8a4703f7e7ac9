//! Configuration and error types for question similarity.
//!
//! Free of I/O and clocks: the only inputs to a score are two fingerprints
//! and a [`SimilarityConfig`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when checking that a weight set sums to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the six component scores in the overall score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub text: f64,
    pub semantic: f64,
    pub structural: f64,
    pub options: f64,
    pub keyword: f64,
    pub answer_pattern: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            text: 0.30,
            semantic: 0.25,
            structural: 0.15,
            options: 0.15,
            keyword: 0.10,
            answer_pattern: 0.05,
        }
    }
}

impl ScoreWeights {
    fn as_array(&self) -> [(&'static str, f64); 6] {
        [
            ("text", self.text),
            ("semantic", self.semantic),
            ("structural", self.structural),
            ("options", self.options),
            ("keyword", self.keyword),
            ("answer_pattern", self.answer_pattern),
        ]
    }

    pub fn validate(&self) -> Result<(), FingerprintError> {
        validate_weight_set("weights", &self.as_array())
    }
}

/// Weights of the structural signature fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StructuralWeights {
    pub length: f64,
    pub option_count: f64,
    pub has_image: f64,
    pub difficulty: f64,
    pub category: f64,
    pub language: f64,
}

impl Default for StructuralWeights {
    fn default() -> Self {
        Self {
            length: 0.2,
            option_count: 0.3,
            has_image: 0.1,
            difficulty: 0.2,
            category: 0.15,
            language: 0.05,
        }
    }
}

impl StructuralWeights {
    fn as_array(&self) -> [(&'static str, f64); 6] {
        [
            ("length", self.length),
            ("option_count", self.option_count),
            ("has_image", self.has_image),
            ("difficulty", self.difficulty),
            ("category", self.category),
            ("language", self.language),
        ]
    }

    pub fn validate(&self) -> Result<(), FingerprintError> {
        validate_weight_set("structural_weights", &self.as_array())
    }
}

fn validate_weight_set(name: &str, weights: &[(&'static str, f64)]) -> Result<(), FingerprintError> {
    for (field, value) in weights {
        if !value.is_finite() || *value < 0.0 {
            return Err(FingerprintError::InvalidConfig(format!(
                "{name}.{field} must be a finite value >= 0.0"
            )));
        }
    }
    let sum: f64 = weights.iter().map(|(_, v)| v).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(FingerprintError::InvalidConfig(format!(
            "{name} must sum to 1.0 (got {sum:.6})"
        )));
    }
    Ok(())
}

/// Configuration for fingerprinting and comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Configuration schema version.
    ///
    /// Any change that can alter a fingerprint or a score must bump this so
    /// stored fingerprints can be told apart.
    pub version: u32,
    /// Weights of the component scores in the overall score.
    pub weights: ScoreWeights,
    /// Weights inside the structural comparator.
    pub structural_weights: StructuralWeights,
    /// Maximum keywords kept per fingerprint.
    pub max_keywords: usize,
    /// Domain terms added to the built-in concept vocabulary.
    pub extra_concepts: Vec<String>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            version: 1,
            weights: ScoreWeights::default(),
            structural_weights: StructuralWeights::default(),
            max_keywords: 10,
            extra_concepts: Vec::new(),
        }
    }
}

impl SimilarityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_structural_weights(mut self, weights: StructuralWeights) -> Self {
        self.structural_weights = weights;
        self
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    pub fn with_extra_concepts<I, S>(mut self, concepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_concepts = concepts.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version == 0 {
            return Err(FingerprintError::InvalidConfig(
                "version must be >= 1".into(),
            ));
        }
        if self.max_keywords == 0 {
            return Err(FingerprintError::InvalidConfig(
                "max_keywords must be >= 1".into(),
            ));
        }
        self.weights.validate()?;
        self.structural_weights.validate()
    }
}

/// Errors raised while fingerprinting a question or building the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("invalid similarity config: {0}")]
    InvalidConfig(String),
    #[error("question id must not be empty")]
    MissingId,
    #[error("question {id} has no comparable text")]
    EmptyText { id: String },
    #[error("question {id} has no options")]
    NoOptions { id: String },
    #[error("question {id}: correct index {correct} out of range for {options} options")]
    CorrectOutOfRange {
        id: String,
        correct: usize,
        options: usize,
    },
    #[error("failed to encode structural signature: {0}")]
    Encode(String),
}
