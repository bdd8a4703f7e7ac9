use canonical::collapse_whitespace;

use crate::error::IngestError;

/// Collapses whitespace, optionally strips remaining control characters, and
/// returns `None` when nothing is left.
///
/// Whitespace is collapsed before stripping so that a newline between two
/// words still separates them.
pub(crate) fn sanitize_optional_string(
    value: Option<String>,
    strip_control: bool,
) -> Option<String> {
    value.and_then(|raw| {
        let collapsed = collapse_whitespace(&raw);
        let cleaned = if strip_control {
            collapsed.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            collapsed
        };
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Like [`sanitize_optional_string`] but a blank result is an error.
pub(crate) fn sanitize_required_field(
    field: &'static str,
    value: String,
    strip_control: bool,
) -> Result<String, IngestError> {
    sanitize_optional_string(Some(value), strip_control).ok_or(IngestError::MissingField(field))
}
