//! Hashing utilities for question fingerprints.
//!
//! Two kinds of hash live here:
//!
//! - [`rolling_hash32`] / [`text_digest`]: a weak, order-sensitive 32-bit
//!   polynomial hash over the normalized stem. It identifies a stem for
//!   caching and display. It is never used to measure distance; collisions
//!   only cost a cache miss.
//! - [`hash_set_digest`]: SHA-256 over a list of already-sorted strings, used
//!   for option sets where equality must not depend on the option order the
//!   author picked.
//!
//! ```rust
//! use canonical::{hash_set_digest, text_digest};
//!
//! assert_eq!(text_digest("Hello, World"), text_digest("hello world"));
//! assert_eq!(text_digest("x").len(), 8);
//!
//! let a = hash_set_digest(&["femur".to_string(), "tibia".to_string()]);
//! assert_eq!(a.len(), 64);
//! ```

use sha2::{Digest, Sha256};

use crate::normalize::normalize_text;

/// Separator between set members; cannot appear in normalized text.
const SET_SEPARATOR: u8 = 0x1f;

/// 31-based polynomial rolling hash over the chars of `text`.
pub fn rolling_hash32(text: &str) -> u32 {
    text.chars()
        .fold(0u32, |h, ch| h.wrapping_mul(31).wrapping_add(ch as u32))
}

/// Normalizes `text` and returns its rolling hash as 8 hex digits.
pub fn text_digest(text: &str) -> String {
    format!("{:08x}", rolling_hash32(&normalize_text(text)))
}

/// SHA-256 hex digest over `items` in the given order.
///
/// Callers sort the items first when the set is unordered.
pub fn hash_set_digest(items: &[String]) -> String {
    let mut hasher = Sha256::new();
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            hasher.update([SET_SEPARATOR]);
        }
        hasher.update(item.as_bytes());
    }
    hex::encode(hasher.finalize())
}
