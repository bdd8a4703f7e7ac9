//! End-to-end duplicate checks against a small stored bank.

mod common;

use common::{elbow_flexion, elbow_paraphrase, hand_washing, spanish_femur};
use qbank_dedup::{Classification, Decision, DuplicateDetector, ReportStatus};

fn detector_with_bank() -> DuplicateDetector {
    let detector = DuplicateDetector::in_memory().expect("detector");
    detector
        .add_approved_question(&elbow_flexion("kin-001"))
        .expect("store elbow question");
    detector
}

#[test]
fn spanish_copy_is_exact_duplicate() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&spanish_femur("es-001")).unwrap();

    let report = detector.check_for_duplicates(&spanish_femur("es-draft"));
    assert_eq!(report.status, ReportStatus::Blocked);
    let top = report.top_match().unwrap();
    assert_eq!(top.question_id, "es-001");
    assert_eq!(top.classification, Classification::Exact);
    assert!((top.similarity.overall_score - 1.0).abs() < 1e-9);
    assert!(report.recommendations[0].contains("es-001"));
}

#[test]
fn unrelated_question_passes() {
    let detector = detector_with_bank();
    let report = detector.check_for_duplicates(&hand_washing("hyg-draft"));

    assert_eq!(report.status, ReportStatus::Clear);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.confidence, 1.0);
    assert!(detector.review_queue().is_empty());

    let a = detector.generate_fingerprint(&elbow_flexion("a")).unwrap();
    let b = detector.generate_fingerprint(&hand_washing("b")).unwrap();
    let score = detector.compare_fingerprints(&a, &b).overall_score;
    assert!(score < 0.2, "unrelated pair scored {score}");
}

#[test]
fn paraphrase_with_shuffled_options_warns() {
    let detector = detector_with_bank();
    let report = detector.check_for_duplicates(&elbow_paraphrase("kin-draft"));

    assert_eq!(report.status, ReportStatus::Warning);
    let top = report.top_match().unwrap();
    assert_eq!(top.question_id, "kin-001");
    assert_eq!(top.classification, Classification::Moderate);

    let s = top.similarity;
    assert!(s.overall_score > 0.65 && s.overall_score < 0.85, "{s:?}");
    assert_eq!(s.options_similarity, 1.0);
    assert!(s.structural_similarity > 0.9);
    assert!(s.text_similarity < 0.8);
    assert!(top.reasons.contains(&"very similar answer options".to_string()));
    assert!(top.reasons.contains(&"same question structure".to_string()));
    assert!(!top.reasons.contains(&"very similar question text".to_string()));
    assert!((report.confidence - s.overall_score).abs() < 1e-12);

    let queue = detector.review_queue();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].report.status, ReportStatus::Warning);
}

#[test]
fn approving_paraphrase_clears_queue_and_stores_it() {
    let detector = detector_with_bank();
    detector.check_for_duplicates(&elbow_paraphrase("kin-draft"));

    let stored = detector
        .approve_question("kin-draft", Some("tests a different phrasing"))
        .unwrap();
    assert_eq!(stored.map(|fp| fp.id), Some("kin-draft".to_string()));
    assert!(detector.review_queue().is_empty());
    assert_eq!(detector.fingerprint_count(), 2);

    let approvals = detector.approvals();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].decision, Decision::Approved);

    // The approved question is skipped when it is checked again.
    let again = detector.check_for_duplicates(&elbow_paraphrase("kin-draft"));
    assert_eq!(again.analysis.candidates_compared, 1);
    assert_eq!(again.status, ReportStatus::Warning);
}

#[test]
fn rejecting_copy_keeps_bank_unchanged() {
    let detector = detector_with_bank();
    let report = detector.check_for_duplicates(&elbow_flexion("kin-copy"));
    assert_eq!(report.status, ReportStatus::Blocked);

    assert_eq!(
        detector
            .reject_question("kin-copy", Some("verbatim copy"))
            .unwrap(),
        1
    );
    assert!(detector.review_queue().is_empty());
    assert_eq!(detector.fingerprint_count(), 1);
    assert_eq!(detector.rejections()[0].decision, Decision::Rejected);
}

#[test]
fn report_serializes_for_reviewers() {
    let detector = detector_with_bank();
    let report = detector.check_for_duplicates(&elbow_paraphrase("kin-draft"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "warning");
    assert_eq!(json["duplicates"][0]["classification"], "moderate");
    assert!(json.get("error").is_none());
}
