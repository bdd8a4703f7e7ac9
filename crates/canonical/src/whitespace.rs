//! Whitespace normalization utilities.
//!
//! Used at the ingest boundary, where field values are cleaned but must keep
//! their punctuation and casing (the stored question is shown to people).

/// Collapses repeated whitespace, trims edges, and turns newlines into
/// single spaces.
///
/// ```rust
/// use canonical::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  hello \n\t world  "), "hello world");
/// assert_eq!(collapse_whitespace("hello\u{00A0}world"), "hello world");
/// assert_eq!(collapse_whitespace("   "), "");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
