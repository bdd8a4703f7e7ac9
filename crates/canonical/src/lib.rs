//! Canonical text layer for question fingerprinting.
//!
//! Everything downstream (scorers, fingerprints, caches) compares text that
//! went through this crate, so two stems that differ only in accents, case,
//! punctuation or spacing end up identical here.
//!
//! ## What we do
//!
//! - Unicode NFKD decomposition with non-spacing marks dropped ("Cuál" → "cual")
//! - Lowercasing
//! - Punctuation and symbols turned into delimiters, whitespace collapsed
//! - Keyword extraction with an English/Spanish stop-word list
//! - Stable, non-cryptographic rolling hash for stems and a SHA-256 digest
//!   for order-insensitive sets (option texts)
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text in, same output
//! on any machine.
//!
//! ```
//! use canonical::{extract_keywords, normalize_text, text_digest};
//!
//! let stem = "¿Cuál es el hueso más largo del cuerpo?";
//! assert_eq!(normalize_text(stem), "cual es el hueso mas largo del cuerpo");
//! assert_eq!(extract_keywords(stem, 10), vec!["hueso", "largo", "cuerpo"]);
//! assert_eq!(text_digest(stem), text_digest("cual es el HUESO mas largo del cuerpo"));
//! ```

mod hash;
mod keywords;
mod normalize;
mod token;
mod whitespace;

pub use crate::hash::{hash_set_digest, rolling_hash32, text_digest};
pub use crate::keywords::{extract_keywords, is_stop_word, MIN_KEYWORD_CHARS};
pub use crate::normalize::normalize_text;
pub use crate::token::tokenize;
pub use crate::whitespace::collapse_whitespace;

/// Bump whenever [`normalize_text`] changes output for any input. Persisted
/// fingerprints carry this so stale ones can be detected.
pub const NORMALIZATION_VERSION: u32 = 1;
