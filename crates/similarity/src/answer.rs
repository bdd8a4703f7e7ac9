//! Answer-pattern extraction and comparison.

use ingest::Question;

use crate::fingerprint::AnswerPattern;
use crate::structural::length_similarity;

const CORRECT_INDEX_WEIGHT: f64 = 0.3;
const OPTION_COUNT_WEIGHT: f64 = 0.2;
const LENGTH_PROFILE_WEIGHT: f64 = 0.3;
const DIGITS_WEIGHT: f64 = 0.1;
const SPECIAL_CHARS_WEIGHT: f64 = 0.1;

impl AnswerPattern {
    pub fn of(question: &Question) -> Self {
        let option_lengths = question
            .option_texts()
            .map(|text| text.chars().count())
            .collect();
        let has_digits = question
            .option_texts()
            .any(|text| text.chars().any(|c| c.is_ascii_digit()));
        let has_special_chars = question
            .option_texts()
            .any(|text| text.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()));
        Self {
            correct_index: question.correct,
            option_count: question.options.len(),
            option_lengths,
            has_digits,
            has_special_chars,
        }
    }
}

/// Weighted similarity of two answer patterns in [0, 1].
pub fn compare_answer_patterns(a: &AnswerPattern, b: &AnswerPattern) -> f64 {
    let mut score = 0.0;
    if a.correct_index == b.correct_index {
        score += CORRECT_INDEX_WEIGHT;
    }
    if a.option_count == b.option_count {
        score += OPTION_COUNT_WEIGHT;
    }
    score += LENGTH_PROFILE_WEIGHT * length_profile(&a.option_lengths, &b.option_lengths);
    if a.has_digits == b.has_digits {
        score += DIGITS_WEIGHT;
    }
    if a.has_special_chars == b.has_special_chars {
        score += SPECIAL_CHARS_WEIGHT;
    }
    score.clamp(0.0, 1.0)
}

// Mean per-slot length similarity; profiles of different size share nothing.
fn length_profile(a: &[usize], b: &[usize]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    if a.is_empty() {
        return 1.0;
    }
    let total: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| length_similarity(*x, *y))
        .sum();
    total / a.len() as f64
}
