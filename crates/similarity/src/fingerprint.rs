//! Fingerprint types.
//!
//! A [`QuestionFingerprint`] is a derived snapshot of one question's content.
//! It is never edited after creation; a changed question gets a new one.
//! Its shape is part of the persisted contract, so incompatible changes must
//! bump [`canonical::NORMALIZATION_VERSION`] or the similarity config version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shape of a question's answer options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerPattern {
    /// Index of the correct option in authoring order.
    pub correct_index: usize,
    pub option_count: usize,
    /// Char length of every option, in authoring order.
    pub option_lengths: Vec<usize>,
    /// Any option contains a digit.
    pub has_digits: bool,
    /// Any option contains a char that is neither alphanumeric nor whitespace.
    pub has_special_chars: bool,
}

/// Comparable summary of a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionFingerprint {
    pub id: String,
    /// Rolling hash of the normalized stem, 8 hex digits.
    ///
    /// Identifies a stem for caching. Never compared for distance.
    pub text_hash: String,
    /// Normalized stem; edit distance runs on this.
    pub normalized_text: String,
    /// Sorted, `|`-joined domain concepts found in the stem.
    pub semantic_hash: String,
    /// JSON-encoded structural signature.
    pub structural_hash: String,
    /// Digest of the sorted normalized option texts.
    pub options_hash: String,
    /// Sorted normalized option texts.
    pub option_texts: Vec<String>,
    pub answer_pattern: AnswerPattern,
    /// Up to `max_keywords` significant stem words in first-occurrence order.
    pub keywords: Vec<String>,
    /// Normalization version the text fields were produced with.
    pub normalization_version: u32,
    pub created_at: DateTime<Utc>,
}

impl QuestionFingerprint {
    /// True when both fingerprints describe the same content. The creation
    /// timestamp is ignored.
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.text_hash == other.text_hash
            && self.normalized_text == other.normalized_text
            && self.semantic_hash == other.semantic_hash
            && self.structural_hash == other.structural_hash
            && self.options_hash == other.options_hash
            && self.option_texts == other.option_texts
            && self.answer_pattern == other.answer_pattern
            && self.keywords == other.keywords
            && self.normalization_version == other.normalization_version
    }

    /// Key identifying this content for comparison caching.
    ///
    /// Two candidates with the same stem but different ids, options or
    /// structure get different keys.
    pub fn content_key(&self) -> String {
        format!(
            "{}:{}:{}:{:08x}",
            self.id,
            self.text_hash,
            self.options_hash,
            canonical::rolling_hash32(&self.structural_hash)
        )
    }
}
