use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

/// Normalize free text into the comparable form used by every scorer.
///
/// The output contains only lowercase alphanumeric characters separated by
/// single ASCII spaces, with no leading or trailing space. Accents are
/// folded by decomposing (NFKD) and dropping non-spacing marks, so Spanish
/// and English spellings of the same word compare equal ("músculo" and
/// "musculo").
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.nfkd() {
        if ch.is_mark_nonspacing() {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            // Lowercasing can expand one char into several (e.g. 'İ').
            for lower in ch.to_lowercase() {
                if !lower.is_mark_nonspacing() {
                    out.push(lower);
                }
            }
        } else {
            pending_space = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_space() {
        assert_eq!(
            normalize_text("What is   the origin,\tof the BICEPS?!"),
            "what is the origin of the biceps"
        );
    }

    #[test]
    fn folds_spanish_diacritics() {
        assert_eq!(normalize_text("Articulación Húmero Año"), "articulacion humero ano");
    }

    #[test]
    fn empty_and_symbol_only_inputs_become_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("  ¿? -- !! "), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize_text("C7 and T1 vertebrae"), "c7 and t1 vertebrae");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_text("Fémur, Tibia & Peroné");
        assert_eq!(normalize_text(&once), once);
    }
}
