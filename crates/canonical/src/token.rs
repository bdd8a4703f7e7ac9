/// Splits normalized text into word tokens.
///
/// Assumes `text` already went through [`normalize_text`](crate::normalize_text);
/// on raw text it only splits on whitespace and keeps punctuation attached.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}
