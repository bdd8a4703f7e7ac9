use super::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use ingest::{QuestionOption, RawQuestion};
use store::{CompressionConfig, InMemoryBackend, KeyValueStore, StoreError};

use crate::corpus::InMemoryCorpus;
use crate::types::{ReportStatus, ANALYSIS_ERROR_RECOMMENDATION};

fn question(id: &str, stem: &str, options: &[&str], correct: usize) -> Question {
    Question {
        id: id.to_string(),
        question: stem.to_string(),
        options: options.iter().copied().map(QuestionOption::new).collect(),
        correct,
        category_id: "kinesiology".to_string(),
        difficulty: "medium".to_string(),
        image: None,
        language: "en".to_string(),
    }
}

fn elbow(id: &str) -> Question {
    question(
        id,
        "Which muscle is the prime mover for elbow flexion?",
        &["Biceps brachii", "Triceps brachii", "Deltoid", "Pectoralis major"],
        0,
    )
}

fn hand_washing(id: &str) -> Question {
    Question {
        category_id: "hygiene".to_string(),
        difficulty: "easy".to_string(),
        ..question(
            id,
            "What is the recommended frequency of hand washing between clients?",
            &[
                "Before and after every session",
                "Once per day",
                "Only when visibly soiled",
            ],
            2,
        )
    }
}

#[derive(Default)]
struct CountingMetrics {
    checks: AtomicUsize,
    persist_failures: AtomicUsize,
}

impl DetectorMetrics for CountingMetrics {
    fn record_check(&self, _status: ReportStatus, _latency: Duration, _duplicates: usize) {
        self.checks.fetch_add(1, Ordering::SeqCst);
    }

    fn record_persist_failure(&self, _key: &str) {
        self.persist_failures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reads nothing, refuses every write.
struct ReadOnlyBackend;

impl KeyValueStore for ReadOnlyBackend {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }
    fn set(&self, key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Backend(format!("read-only: {key}")))
    }
    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::backend("read-only"))
    }
}

/// Shared records whose reads can be switched off between sessions.
#[derive(Clone, Default)]
struct FlakyBackend {
    records: Arc<InMemoryBackend>,
    reads_fail: Arc<AtomicBool>,
}

impl FlakyBackend {
    fn open(&self) -> DuplicateDetector {
        DuplicateDetector::new(
            DetectorConfig::default(),
            SimilarityConfig::default(),
            Collections::new(Box::new(self.clone()), CompressionConfig::default()),
        )
        .unwrap()
    }

    fn set_reads_fail(&self, fail: bool) {
        self.reads_fail.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.reads_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("read timed out: {key}")));
        }
        self.records.get(key)
    }
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.records.set(key, value)
    }
    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records.delete(key)
    }
}

#[test]
fn exact_copy_is_blocked_and_queued() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();

    let report = detector.check_for_duplicates(&elbow("q-2"));
    assert_eq!(report.status, ReportStatus::Blocked);
    assert_eq!(report.duplicates.len(), 1);
    let top = report.top_match().unwrap();
    assert_eq!(top.question_id, "q-1");
    assert_eq!(top.classification, crate::Classification::Exact);
    assert!((report.confidence - 1.0).abs() < 1e-9);
    assert!(top.reasons.contains(&"very similar question text".to_string()));

    let queue = detector.review_queue();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].candidate.id, "q-2");
    assert_eq!(queue[0].report, report);
}

#[test]
fn unrelated_question_is_clear() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();

    let report = detector.check_for_duplicates(&hand_washing("q-2"));
    assert_eq!(report.status, ReportStatus::Clear);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.confidence, 1.0);
    assert_eq!(report.analysis.corpus_size, 1);
    assert_eq!(report.analysis.candidates_compared, 1);
    assert!(detector.review_queue().is_empty());
}

#[test]
fn stored_question_is_not_its_own_duplicate() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();

    let report = detector.check_for_duplicates(&elbow("q-1"));
    assert_eq!(report.status, ReportStatus::Clear);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.analysis.corpus_size, 1);
    assert_eq!(report.analysis.candidates_compared, 0);
}

#[test]
fn malformed_candidate_yields_error_report() {
    let metrics = Arc::new(CountingMetrics::default());
    let detector = DuplicateDetector::in_memory()
        .unwrap()
        .with_metrics(metrics.clone());
    detector.add_approved_question(&elbow("q-1")).unwrap();

    let broken = question("q-2", "Which muscle flexes the elbow?", &[], 0);
    let report = detector.check_for_duplicates(&broken);
    assert_eq!(report.status, ReportStatus::Error);
    assert_eq!(report.recommendations, vec![ANALYSIS_ERROR_RECOMMENDATION]);
    assert!(report.error.is_some());
    assert_eq!(report.analysis.corpus_size, 1);
    assert!(detector.review_queue().is_empty());
    assert_eq!(metrics.checks.load(Ordering::SeqCst), 1);
}

#[test]
fn review_queue_keeps_most_recent_entries() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-0")).unwrap();

    for i in 0..150 {
        let report = detector.check_for_duplicates(&elbow(&format!("c-{i}")));
        assert_eq!(report.status, ReportStatus::Blocked);
    }

    let queue = detector.review_queue();
    assert_eq!(queue.len(), 100);
    assert_eq!(queue[0].candidate.id, "c-50");
    assert_eq!(queue[99].candidate.id, "c-149");
}

#[test]
fn approval_stores_queued_fingerprint() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();
    let report = detector.check_for_duplicates(&elbow("q-2"));
    assert!(report.status.needs_review());

    let stored = detector
        .approve_question("q-2", Some("kept for the practice set"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, "q-2");
    assert!(detector.review_queue().is_empty());
    assert_eq!(detector.fingerprint_count(), 2);
    assert!(detector.fingerprint("q-2").is_some());

    let approvals = detector.approvals();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].decision, Decision::Approved);
    assert_eq!(approvals[0].queue_entries_removed, 1);
    assert_eq!(approvals[0].note.as_deref(), Some("kept for the practice set"));
}

#[test]
fn approving_unqueued_id_only_logs() {
    let detector = DuplicateDetector::in_memory().unwrap();
    assert!(detector.approve_question("ghost", None).unwrap().is_none());
    assert_eq!(detector.fingerprint_count(), 0);
    assert_eq!(detector.approvals()[0].queue_entries_removed, 0);

    let err = detector.approve_question("  ", None).unwrap_err();
    assert!(matches!(err, DetectorError::InvalidInput(_)));
    assert_eq!(detector.approvals().len(), 1);
}

#[test]
fn rejection_drops_every_entry_for_id() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();
    detector.check_for_duplicates(&elbow("q-2"));
    detector.check_for_duplicates(&elbow("q-2"));
    detector.check_for_duplicates(&elbow("q-3"));
    assert_eq!(detector.review_queue().len(), 3);

    let removed = detector
        .reject_question("q-2", Some("copy of q-1"))
        .unwrap();
    assert_eq!(removed, 2);
    let queue = detector.review_queue();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].candidate.id, "q-3");

    let rejections = detector.rejections();
    assert_eq!(rejections[0].decision, Decision::Rejected);
    assert_eq!(rejections[0].note.as_deref(), Some("copy of q-1"));
    assert_eq!(detector.fingerprint_count(), 1);
}

#[test]
fn audit_logs_are_bounded() {
    let cfg = DetectorConfig::default().with_audit_log_capacity(3);
    let detector =
        DuplicateDetector::new(cfg, SimilarityConfig::default(), Collections::in_memory()).unwrap();
    for i in 0..5 {
        detector.reject_question(&format!("r-{i}"), None).unwrap();
    }
    let ids: Vec<_> = detector
        .rejections()
        .into_iter()
        .map(|r| r.question_id)
        .collect();
    assert_eq!(ids, vec!["r-2", "r-3", "r-4"]);
}

#[test]
fn second_check_hits_cache_until_store_changes() {
    let detector = DuplicateDetector::in_memory().unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();

    let first = detector.check_for_duplicates(&elbow("q-2"));
    let second = detector.check_for_duplicates(&elbow("q-2"));
    assert!(!first.analysis.cache_hit);
    assert!(second.analysis.cache_hit);
    assert_eq!(first.duplicates, second.duplicates);
    assert_eq!(detector.statistics().cached_comparisons, 1);

    detector.add_approved_question(&hand_washing("q-3")).unwrap();
    assert_eq!(detector.statistics().cached_comparisons, 0);
    let third = detector.check_for_duplicates(&elbow("q-2"));
    assert!(!third.analysis.cache_hit);
    assert_eq!(third.analysis.corpus_size, 2);

    detector.clear_caches();
    assert_eq!(detector.statistics().cached_comparisons, 0);
}

#[test]
fn disabled_cache_never_hits() {
    let cfg = DetectorConfig::default().with_cache(false);
    let detector =
        DuplicateDetector::new(cfg, SimilarityConfig::default(), Collections::in_memory()).unwrap();
    detector.add_approved_question(&elbow("q-1")).unwrap();
    detector.check_for_duplicates(&elbow("q-2"));
    let again = detector.check_for_duplicates(&elbow("q-2"));
    assert!(!again.analysis.cache_hit);
    assert_eq!(detector.statistics().cached_comparisons, 0);
}

#[test]
fn parallel_and_sequential_agree() {
    let sequential = DuplicateDetector::in_memory().unwrap();
    let parallel = DuplicateDetector::new(
        DetectorConfig::default().with_parallel(true),
        SimilarityConfig::default(),
        Collections::in_memory(),
    )
    .unwrap();

    let bank = [
        elbow("q-1"),
        elbow("q-2"),
        hand_washing("q-3"),
        question(
            "q-4",
            "Which muscle extends the elbow?",
            &["Triceps brachii", "Biceps brachii", "Deltoid", "Pectoralis major"],
            0,
        ),
    ];
    for q in &bank {
        sequential.add_approved_question(q).unwrap();
        parallel.add_approved_question(q).unwrap();
    }

    let candidate = elbow("c-1");
    let a = sequential.check_for_duplicates(&candidate);
    let b = parallel.check_for_duplicates(&candidate);
    assert_eq!(a.status, b.status);
    assert_eq!(a.duplicates, b.duplicates);
    assert_eq!(a.recommendations, b.recommendations);
    let ids: Vec<_> = a.duplicates.iter().map(|m| m.question_id.as_str()).collect();
    assert_eq!(&ids[..2], &["q-1", "q-2"]);
}

#[test]
fn write_failures_do_not_fail_operations() {
    let metrics = Arc::new(CountingMetrics::default());
    let collections = Collections::new(Box::new(ReadOnlyBackend), CompressionConfig::default());
    let detector = DuplicateDetector::new(
        DetectorConfig::default(),
        SimilarityConfig::default(),
        collections,
    )
    .unwrap()
    .with_metrics(metrics.clone());

    detector.add_approved_question(&elbow("q-1")).unwrap();
    let report = detector.check_for_duplicates(&elbow("q-2"));
    assert_eq!(report.status, ReportStatus::Blocked);
    assert_eq!(detector.review_queue().len(), 1);
    assert_eq!(detector.reject_question("q-2", None).unwrap(), 1);

    let stats = detector.statistics();
    assert_eq!(stats.fingerprints, 1);
    assert_eq!(stats.review_queue, 0);
    assert_eq!(stats.rejections, 1);
    // fingerprints, queue push, queue removal, rejection log
    assert_eq!(metrics.persist_failures.load(Ordering::SeqCst), 4);
}

#[cfg(feature = "backend-redb")]
#[test]
fn state_survives_reopen_with_redb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qbank.redb");
    let open = || {
        let backend = store::BackendConfig::redb(path.to_string_lossy()).build().unwrap();
        DuplicateDetector::new(
            DetectorConfig::default(),
            SimilarityConfig::default(),
            Collections::new(backend, CompressionConfig::default()),
        )
        .unwrap()
    };

    {
        let detector = open();
        detector.add_approved_question(&elbow("q-1")).unwrap();
        detector.check_for_duplicates(&elbow("q-2"));
        detector.reject_question("q-9", Some("off topic")).unwrap();
    }

    let reopened = open();
    assert_eq!(reopened.fingerprint_count(), 1);
    assert_eq!(reopened.fingerprint("q-1").unwrap().id, "q-1");
    let queue = reopened.review_queue();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].candidate.id, "q-2");
    assert_eq!(reopened.rejections().len(), 1);

    assert!(reopened.approve_question("q-2", None).unwrap().is_some());
    assert_eq!(reopened.fingerprint_count(), 2);
}

#[test]
fn unreadable_collection_is_not_overwritten() {
    let backend = FlakyBackend::default();
    {
        let detector = backend.open();
        detector.add_approved_question(&elbow("kin-001")).unwrap();
        detector.add_approved_question(&hand_washing("hyg-001")).unwrap();
    }

    backend.set_reads_fail(true);
    let metrics = Arc::new(CountingMetrics::default());
    let degraded = backend.open().with_metrics(metrics.clone());
    assert_eq!(degraded.fingerprint_count(), 0);
    degraded.add_approved_question(&elbow("es-001")).unwrap();
    assert_eq!(degraded.fingerprint_count(), 1);
    assert_eq!(metrics.persist_failures.load(Ordering::SeqCst), 1);

    backend.set_reads_fail(false);
    let reopened = backend.open();
    assert_eq!(reopened.fingerprint_count(), 2);
    assert!(reopened.fingerprint("kin-001").is_some());
    assert!(reopened.fingerprint("hyg-001").is_some());
}

#[test]
fn recovered_collections_merge_with_session_state() {
    let backend = FlakyBackend::default();
    {
        let detector = backend.open();
        detector.add_approved_question(&elbow("kin-001")).unwrap();
        detector.add_approved_question(&hand_washing("hyg-001")).unwrap();
        let report = detector.check_for_duplicates(&elbow("c-1"));
        assert_eq!(report.status, ReportStatus::Blocked);
    }

    backend.set_reads_fail(true);
    let detector = backend.open();
    detector.add_approved_question(&elbow("kin-002")).unwrap();
    detector.reject_question("r-1", None).unwrap();
    assert!(detector.review_queue().is_empty());

    backend.set_reads_fail(false);
    detector.add_approved_question(&elbow("kin-003")).unwrap();
    assert_eq!(detector.fingerprint_count(), 4);

    // the persisted queue entry is visible again once its collection reloads
    let approved = detector.approve_question("c-1", None).unwrap();
    assert_eq!(approved.unwrap().id, "c-1");
    detector.reject_question("r-2", None).unwrap();

    let reopened = backend.open();
    assert_eq!(reopened.fingerprint_count(), 5);
    assert!(reopened.review_queue().is_empty());
    assert_eq!(reopened.approvals().len(), 1);
    let rejected: Vec<_> = reopened
        .rejections()
        .into_iter()
        .map(|r| r.question_id)
        .collect();
    assert_eq!(rejected, vec!["r-1", "r-2"]);
}

#[test]
fn initialize_backfills_empty_store_once() {
    let raw = |id: &str, correct: i64| RawQuestion {
        id: id.to_string(),
        question: "Which muscle is the prime mover for elbow flexion?".to_string(),
        options: vec!["Biceps brachii".into(), "Triceps brachii".into()],
        correct,
        category_id: Some("kinesiology".into()),
        difficulty: None,
        image: None,
        language: None,
    };
    let corpus = InMemoryCorpus::new()
        .with_topic("kin", "Kinesiology", vec![raw("k-1", 0), raw("k-2", 7)])
        .with_topic("anat", "Anatomy", vec![raw("a-1", 1)]);

    let detector = DuplicateDetector::in_memory().unwrap();
    assert_eq!(detector.initialize(&corpus).unwrap(), 2);
    assert_eq!(detector.fingerprint_count(), 2);
    assert!(detector.fingerprint("k-2").is_none());

    assert_eq!(detector.initialize(&corpus).unwrap(), 0);
    assert_eq!(detector.fingerprint_count(), 2);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = DetectorConfig::default().with_review_queue_capacity(0);
    assert!(matches!(
        DuplicateDetector::new(cfg, SimilarityConfig::default(), Collections::in_memory()),
        Err(DetectorError::InvalidConfig(_))
    ));
}
