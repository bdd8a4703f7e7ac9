//! Structural comparison of question shape.

use ingest::Question;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{FingerprintError, StructuralWeights};
use crate::SimilarityScorer;

/// Shape of a question, serialized as the structural hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuralSignature {
    /// Stem length in chars.
    pub length: usize,
    pub option_count: usize,
    pub has_image: bool,
    pub difficulty: String,
    pub category: String,
    pub language: String,
}

impl StructuralSignature {
    pub fn of(question: &Question) -> Self {
        Self {
            length: question.question.chars().count(),
            option_count: question.options.len(),
            has_image: question.has_image(),
            difficulty: question.difficulty.clone(),
            category: question.category_id.clone(),
            language: question.language.clone(),
        }
    }
}

/// Weighted field-by-field comparison of [`StructuralSignature`]s.
#[derive(Debug, Clone, Default)]
pub struct StructuralComparator {
    weights: StructuralWeights,
}

impl StructuralComparator {
    pub fn new(weights: StructuralWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &StructuralWeights {
        &self.weights
    }

    pub fn compare_signatures(&self, a: &StructuralSignature, b: &StructuralSignature) -> f64 {
        let w = &self.weights;
        let score = w.length * length_similarity(a.length, b.length)
            + w.option_count * exact(a.option_count == b.option_count)
            + w.has_image * exact(a.has_image == b.has_image)
            + w.difficulty * exact(a.difficulty == b.difficulty)
            + w.category * exact(a.category == b.category)
            + w.language * exact(a.language == b.language);
        score.clamp(0.0, 1.0)
    }
}

impl SimilarityScorer for StructuralComparator {
    type Input = Question;

    fn generate_hash(&self, question: &Question) -> Result<String, FingerprintError> {
        serde_json::to_string(&StructuralSignature::of(question))
            .map_err(|e| FingerprintError::Encode(e.to_string()))
    }

    /// Malformed input scores 0.0.
    fn compare(&self, a: &str, b: &str) -> f64 {
        match (parse_signature(a), parse_signature(b)) {
            (Some(a), Some(b)) => self.compare_signatures(&a, &b),
            _ => 0.0,
        }
    }
}

fn parse_signature(hash: &str) -> Option<StructuralSignature> {
    match serde_json::from_str(hash) {
        Ok(signature) => Some(signature),
        Err(err) => {
            warn!(error = %err, hash_len = hash.len(), "structural_hash_malformed");
            None
        }
    }
}

fn exact(equal: bool) -> f64 {
    if equal { 1.0 } else { 0.0 }
}

/// `1 - |a - b| / max(a, b)`, 1.0 when both are zero.
pub(crate) fn length_similarity(a: usize, b: usize) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 1.0;
    }
    1.0 - a.abs_diff(b) as f64 / max as f64
}
