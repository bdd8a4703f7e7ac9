//! Text similarity over normalized stems.
//!
//! The signature is the normalized stem itself. Edit distance runs on that
//! text; the 32-bit rolling digest only identifies a stem and is never fed
//! to the distance function.

use canonical::{normalize_text, text_digest};

use crate::config::FingerprintError;
use crate::SimilarityScorer;

/// Levenshtein-based scorer.
///
/// ```
/// use similarity::{SimilarityScorer, TextScorer};
///
/// let scorer = TextScorer;
/// let a = scorer.generate_hash("Which bone is the LONGEST?").unwrap();
/// let b = scorer.generate_hash("which bone is the longest").unwrap();
/// assert_eq!(scorer.compare(&a, &b), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextScorer;

impl TextScorer {
    /// Stable 8-hex-digit identity of a stem.
    pub fn digest(&self, text: &str) -> String {
        text_digest(text)
    }
}

impl SimilarityScorer for TextScorer {
    type Input = str;

    fn generate_hash(&self, text: &str) -> Result<String, FingerprintError> {
        Ok(normalize_text(text))
    }

    fn compare(&self, a: &str, b: &str) -> f64 {
        normalized_levenshtein(a, b)
    }
}

/// `(max_len - distance) / max_len` over chars.
fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    (max_len - distance.min(max_len)) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive_and_empty_rules() {
        let s = TextScorer;
        assert_eq!(s.compare("origin of the biceps", "origin of the biceps"), 1.0);
        assert_eq!(s.compare("", ""), 1.0);
        assert_eq!(s.compare("abc", ""), 0.0);
        assert_eq!(s.compare("", "abc"), 0.0);
    }

    #[test]
    fn symmetric() {
        let s = TextScorer;
        let pairs = [
            ("kitten", "sitting"),
            ("cual es el hueso", "which is the bone"),
            ("femur", "fémur"),
        ];
        for (a, b) in pairs {
            assert_eq!(s.compare(a, b), s.compare(b, a));
        }
    }

    #[test]
    fn kitten_sitting_distance() {
        // kitten -> sitting is 3 edits over 7 chars
        let score = TextScorer.compare("kitten", "sitting");
        assert!((score - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn multibyte_chars_count_once() {
        let score = TextScorer.compare("húmero", "humero");
        assert!((score - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn digest_is_stable_across_formatting() {
        assert_eq!(
            TextScorer.digest("¿Cuál es el hueso?"),
            TextScorer.digest("cual es el  HUESO")
        );
    }
}
