use serde::{Deserialize, Serialize};

use crate::config::ScoreWeights;

/// Component and overall similarity of one compared pair. Every field is in
/// [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SimilarityResult {
    pub text_similarity: f64,
    pub semantic_similarity: f64,
    pub structural_similarity: f64,
    pub options_similarity: f64,
    pub keyword_similarity: f64,
    pub answer_pattern_similarity: f64,
    pub overall_score: f64,
}

impl SimilarityResult {
    /// Builds a result from component scores, clamping each, and computes the
    /// weighted overall score.
    pub fn from_components(
        text: f64,
        semantic: f64,
        structural: f64,
        options: f64,
        keyword: f64,
        answer_pattern: f64,
        weights: &ScoreWeights,
    ) -> Self {
        let mut result = Self {
            text_similarity: unit(text),
            semantic_similarity: unit(semantic),
            structural_similarity: unit(structural),
            options_similarity: unit(options),
            keyword_similarity: unit(keyword),
            answer_pattern_similarity: unit(answer_pattern),
            overall_score: 0.0,
        };
        result.overall_score = result.weighted(weights);
        result
    }

    /// Weighted sum of the components, clamped to [0, 1].
    pub fn weighted(&self, w: &ScoreWeights) -> f64 {
        let sum = w.text * self.text_similarity
            + w.semantic * self.semantic_similarity
            + w.structural * self.structural_similarity
            + w.options * self.options_similarity
            + w.keyword * self.keyword_similarity
            + w.answer_pattern * self.answer_pattern_similarity;
        unit(sum)
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
