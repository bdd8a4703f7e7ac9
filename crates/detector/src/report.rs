//! Turning scored pairs into a report.

use similarity::SimilarityResult;

use crate::config::Thresholds;
use crate::types::{Classification, DuplicateMatch, ReportStatus};

// (component threshold, reason). A component strictly above its threshold
// contributes its reason.
const TEXT_REASON: (f64, &str) = (0.8, "very similar question text");
const SEMANTIC_REASON: (f64, &str) = (0.7, "shares the same domain concepts");
const STRUCTURAL_REASON: (f64, &str) = (0.9, "same question structure");
const OPTIONS_REASON: (f64, &str) = (0.8, "very similar answer options");
const KEYWORD_REASON: (f64, &str) = (0.6, "overlapping keywords");
const ANSWER_PATTERN_REASON: (f64, &str) = (0.9, "same answer pattern");
const FALLBACK_REASON: &str = "similar overall content";

/// Reasons for one pair, in component order.
pub fn reasons_for(result: &SimilarityResult) -> Vec<String> {
    let checks = [
        (result.text_similarity, TEXT_REASON),
        (result.semantic_similarity, SEMANTIC_REASON),
        (result.structural_similarity, STRUCTURAL_REASON),
        (result.options_similarity, OPTIONS_REASON),
        (result.keyword_similarity, KEYWORD_REASON),
        (result.answer_pattern_similarity, ANSWER_PATTERN_REASON),
    ];
    let mut reasons: Vec<String> = checks
        .iter()
        .filter(|(score, (threshold, _))| *score > *threshold)
        .map(|(_, (_, reason))| reason.to_string())
        .collect();
    if reasons.is_empty() {
        reasons.push(FALLBACK_REASON.to_string());
    }
    reasons
}

/// Sorts `scored` by descending overall score (ties by id) and classifies
/// each pair. Pairs classified [`Classification::None`] are dropped.
pub fn build_matches(
    mut scored: Vec<(String, SimilarityResult)>,
    thresholds: &Thresholds,
) -> Vec<DuplicateMatch> {
    scored.sort_by(|(id_a, a), (id_b, b)| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| id_a.cmp(id_b))
    });
    scored
        .into_iter()
        .filter_map(|(question_id, similarity)| {
            let classification = thresholds.classify(similarity.overall_score);
            if classification == Classification::None {
                return None;
            }
            Some(DuplicateMatch {
                question_id,
                reasons: reasons_for(&similarity),
                similarity,
                classification,
            })
        })
        .collect()
}

/// Most severe status across all matches.
pub fn aggregate_status(matches: &[DuplicateMatch]) -> ReportStatus {
    let worst = matches
        .iter()
        .map(|m| m.classification)
        .max()
        .unwrap_or(Classification::None);
    match worst {
        Classification::Exact => ReportStatus::Blocked,
        Classification::High | Classification::Moderate => ReportStatus::Warning,
        Classification::Low | Classification::None => ReportStatus::Clear,
    }
}

pub fn recommendations_for(status: ReportStatus, matches: &[DuplicateMatch]) -> Vec<String> {
    let top = matches.first();
    match (status, top) {
        (ReportStatus::Blocked, Some(m)) => vec![
            format!("Exact duplicate of question {}; do not add it to the bank", m.question_id),
            "Edit the existing question instead of creating a new one".to_string(),
        ],
        (ReportStatus::Warning, Some(m)) if m.classification == Classification::High => vec![
            format!(
                "Highly similar to question {}; rewrite the stem or options before approval",
                m.question_id
            ),
            "Confirm with a reviewer that the question tests a different concept".to_string(),
        ],
        (ReportStatus::Warning, Some(m)) => vec![format!(
            "Moderately similar to question {}; confirm it tests a different concept",
            m.question_id
        )],
        (ReportStatus::Clear, Some(_)) => {
            vec!["Only low similarity to existing questions; safe to add".to_string()]
        }
        (ReportStatus::Error, _) => vec![crate::types::ANALYSIS_ERROR_RECOMMENDATION.to_string()],
        _ => vec!["No similar questions found; safe to add".to_string()],
    }
}
