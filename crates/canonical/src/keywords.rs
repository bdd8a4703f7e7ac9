use std::collections::HashSet;

use crate::normalize::normalize_text;
use crate::token::tokenize;

/// Words shorter than this many chars never count as keywords.
pub const MIN_KEYWORD_CHARS: usize = 4;

// Normalized (accent-folded) English and Spanish function words of at least
// MIN_KEYWORD_CHARS chars. Shorter words are dropped by length already.
const STOP_WORDS: &[&str] = &[
    // English
    "about", "above", "after", "also", "because", "been", "before", "being", "best",
    "both", "could", "does", "each", "following", "from", "have", "into", "least",
    "like", "most", "must", "only", "other", "should", "some", "such", "than", "that",
    "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "true", "false", "under", "used", "very", "were", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
    // Spanish
    "algo", "antes", "como", "cual", "cuales", "cuando", "cuanto", "desde", "donde",
    "durante", "entre", "esta", "estas", "este", "esto", "estos", "hacia", "hasta",
    "mientras", "mucho", "nada", "otra", "otras", "otro", "otros", "para", "pero",
    "porque", "puede", "pueden", "quien", "segun", "siguiente", "siguientes", "sobre",
    "tambien", "tiene", "tienen", "todas", "todos", "usted", "verdadero", "falso",
];

/// Returns true when `word` (already normalized) is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Extracts up to `max` significant words from `text`.
///
/// Words are normalized, must have at least [`MIN_KEYWORD_CHARS`] chars, must
/// not be stop words or pure numbers, and are de-duplicated keeping their
/// first occurrence order.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let normalized = normalize_text(text);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for word in tokenize(&normalized) {
        if out.len() >= max {
            break;
        }
        if word.chars().count() < MIN_KEYWORD_CHARS
            || is_stop_word(word)
            || word.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if seen.insert(word) {
            out.push(word.to_string());
        }
    }

    out
}
