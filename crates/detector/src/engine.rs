use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use ingest::{ingest_question, IngestConfig, Question};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use similarity::{QuestionFingerprint, SimilarityConfig, SimilarityEngine, SimilarityResult};
use store::{
    BoundedLog, Collections, FingerprintStore, APPROVALS_KEY, FINGERPRINTS_KEY, REJECTIONS_KEY,
    REVIEW_QUEUE_KEY,
};
use tracing::{debug, info, info_span, warn};

use crate::config::DetectorConfig;
use crate::corpus::QuestionCorpus;
use crate::metrics::DetectorMetrics;
use crate::report::{aggregate_status, build_matches, recommendations_for};
use crate::types::{
    AnalysisDetails, AuditRecord, Decision, DetectorError, DetectorStats, DuplicateReport,
    ReviewQueueEntry,
};

#[cfg(test)]
mod tests;

type ScoredPairs = Vec<(String, SimilarityResult)>;

/// Duplicate gate over a question bank.
///
/// Owns the fingerprint store, the similarity engine, the comparison cache,
/// the review queue and the audit logs. Every mutation writes the affected
/// collection back through [`Collections`].
pub struct DuplicateDetector {
    cfg: DetectorConfig,
    ingest_cfg: IngestConfig,
    engine: SimilarityEngine,
    fingerprints: FingerprintStore,
    collections: Collections,
    // Held across insert + write-back so concurrent approvals persist in order.
    fingerprint_writes: Mutex<()>,
    cache: Mutex<HashMap<String, ScoredPairs>>,
    review_queue: Mutex<BoundedLog<ReviewQueueEntry>>,
    approvals: Mutex<BoundedLog<AuditRecord>>,
    rejections: Mutex<BoundedLog<AuditRecord>>,
    // Keys that failed to load. Never written back until a reload succeeds.
    unloaded: Mutex<HashSet<String>>,
    metrics: Option<Arc<dyn DetectorMetrics>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DuplicateDetector {
    /// Builds a detector and loads any previously persisted state.
    ///
    /// Unreadable collections are logged and start empty. Their persisted
    /// copy is left untouched until a later mutation reads it back cleanly
    /// and merges it with what this session added.
    pub fn new(
        cfg: DetectorConfig,
        similarity_cfg: SimilarityConfig,
        collections: Collections,
    ) -> Result<Self, DetectorError> {
        cfg.validate()?;
        let engine = SimilarityEngine::new(similarity_cfg)?;

        let mut unloaded = HashSet::new();
        let fingerprints = FingerprintStore::from_map(load_logged(
            &collections,
            FINGERPRINTS_KEY,
            &mut unloaded,
        ));
        let review_queue: BoundedLog<ReviewQueueEntry> = BoundedLog::from_vec(
            cfg.review_queue_capacity,
            load_logged(&collections, REVIEW_QUEUE_KEY, &mut unloaded),
        );
        let approvals: BoundedLog<AuditRecord> = BoundedLog::from_vec(
            cfg.audit_log_capacity,
            load_logged(&collections, APPROVALS_KEY, &mut unloaded),
        );
        let rejections: BoundedLog<AuditRecord> = BoundedLog::from_vec(
            cfg.audit_log_capacity,
            load_logged(&collections, REJECTIONS_KEY, &mut unloaded),
        );

        info!(
            fingerprints = fingerprints.len(),
            review_queue = review_queue.len(),
            approvals = approvals.len(),
            rejections = rejections.len(),
            unloaded = unloaded.len(),
            "detector_loaded"
        );

        Ok(Self {
            cfg,
            ingest_cfg: IngestConfig::default(),
            engine,
            fingerprints,
            collections,
            fingerprint_writes: Mutex::new(()),
            cache: Mutex::new(HashMap::new()),
            review_queue: Mutex::new(review_queue),
            approvals: Mutex::new(approvals),
            rejections: Mutex::new(rejections),
            unloaded: Mutex::new(unloaded),
            metrics: None,
        })
    }

    /// Default configuration over an in-memory store.
    pub fn in_memory() -> Result<Self, DetectorError> {
        Self::new(
            DetectorConfig::default(),
            SimilarityConfig::default(),
            Collections::in_memory(),
        )
    }

    /// Ingest settings used when bootstrapping from a corpus.
    pub fn with_ingest_config(mut self, ingest_cfg: IngestConfig) -> Result<Self, DetectorError> {
        ingest_cfg.validate()?;
        self.ingest_cfg = ingest_cfg;
        Ok(self)
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn DetectorMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    pub fn similarity_engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    /// Checks `candidate` against every stored fingerprint.
    ///
    /// Never fails: an internal error becomes a report with
    /// [`ReportStatus::Error`](crate::ReportStatus::Error). Warning and
    /// blocked reports are copied into the review queue.
    pub fn check_for_duplicates(&self, candidate: &Question) -> DuplicateReport {
        let span = info_span!("check_for_duplicates", question_id = %candidate.id);
        let _guard = span.enter();
        let start = Instant::now();

        let report = match self.analyze(candidate) {
            Ok((report, fingerprint)) => {
                if report.status.needs_review() {
                    self.enqueue(candidate, fingerprint, &report);
                }
                report
            }
            Err(err) => {
                warn!(error = %err, "duplicate_check_failed");
                DuplicateReport::analysis_error(&candidate.id, self.fingerprints.len(), err.to_string())
            }
        };

        let latency = start.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_check(report.status, latency, report.duplicates.len());
        }
        info!(
            status = report.status.as_str(),
            duplicates = report.duplicates.len(),
            corpus_size = report.analysis.corpus_size,
            cache_hit = report.analysis.cache_hit,
            elapsed_micros = latency.as_micros(),
            "duplicate_check_complete"
        );
        report
    }

    fn analyze(
        &self,
        candidate: &Question,
    ) -> Result<(DuplicateReport, QuestionFingerprint), DetectorError> {
        let fingerprint = self.engine.fingerprint(candidate)?;
        let snapshot = self.fingerprints.snapshot();
        let corpus_size = snapshot.len();
        let candidates_compared = snapshot
            .iter()
            .filter(|stored| stored.id != fingerprint.id)
            .count();

        let key = fingerprint.content_key();
        let (scored, cache_hit) = match self.cached(&key) {
            Some(scored) => (scored, true),
            None => {
                let scored = self.compare_all(&fingerprint, &snapshot);
                if self.cfg.cache_enabled {
                    lock(&self.cache).insert(key, scored.clone());
                }
                (scored, false)
            }
        };

        let duplicates = build_matches(scored, &self.cfg.thresholds);
        let status = aggregate_status(&duplicates);
        let confidence = duplicates
            .first()
            .map(|m| m.similarity.overall_score)
            .unwrap_or(1.0);

        let report = DuplicateReport {
            candidate_id: fingerprint.id.clone(),
            status,
            recommendations: recommendations_for(status, &duplicates),
            duplicates,
            confidence,
            analysis: AnalysisDetails {
                corpus_size,
                candidates_compared,
                cache_hit,
                analyzed_at: Utc::now(),
            },
            error: None,
        };
        Ok((report, fingerprint))
    }

    fn cached(&self, key: &str) -> Option<ScoredPairs> {
        if !self.cfg.cache_enabled {
            return None;
        }
        lock(&self.cache).get(key).cloned()
    }

    // Surfaced pairs only; the candidate's own id is skipped.
    fn compare_all(
        &self,
        candidate: &QuestionFingerprint,
        snapshot: &[Arc<QuestionFingerprint>],
    ) -> ScoredPairs {
        let thresholds = &self.cfg.thresholds;
        let score = |stored: &Arc<QuestionFingerprint>| {
            if stored.id == candidate.id {
                return None;
            }
            let result = self.engine.compare(candidate, stored);
            thresholds
                .surfaces(result.overall_score)
                .then(|| (stored.id.clone(), result))
        };
        if self.cfg.use_parallel {
            snapshot.par_iter().filter_map(score).collect()
        } else {
            snapshot.iter().filter_map(score).collect()
        }
    }

    fn enqueue(&self, candidate: &Question, fingerprint: QuestionFingerprint, report: &DuplicateReport) {
        let entry = ReviewQueueEntry {
            candidate: candidate.clone(),
            fingerprint,
            report: report.clone(),
            queued_at: Utc::now(),
        };
        let mut queue = lock(&self.review_queue);
        self.reconcile_log(REVIEW_QUEUE_KEY, &mut *queue);
        if let Some(evicted) = queue.push(entry) {
            debug!(evicted = %evicted.candidate.id, "review_queue_evicted");
        }
        self.persist(REVIEW_QUEUE_KEY, &*queue);
    }

    /// Fingerprints `question` and adds it to the store.
    ///
    /// Nothing is stored when fingerprinting fails. A failed write-back is
    /// logged and retried with the next mutation.
    pub fn add_approved_question(
        &self,
        question: &Question,
    ) -> Result<QuestionFingerprint, DetectorError> {
        let fingerprint = self.engine.fingerprint(question)?;
        self.store_fingerprint(fingerprint.clone());
        Ok(fingerprint)
    }

    fn store_fingerprint(&self, fingerprint: QuestionFingerprint) {
        let id = fingerprint.id.clone();
        let _writes = lock(&self.fingerprint_writes);
        self.reconcile_fingerprints();
        let replaced = self.fingerprints.insert(fingerprint).is_some();
        self.persist(FINGERPRINTS_KEY, &self.fingerprints.to_map());
        lock(&self.cache).clear();
        info!(
            question_id = %id,
            replaced,
            fingerprints = self.fingerprints.len(),
            "fingerprint_added"
        );
    }

    /// Approves `question_id`: drops its review entries, records the approval
    /// and fingerprints the most recently queued candidate with that id.
    ///
    /// Returns the stored fingerprint, or `None` when nothing was queued.
    pub fn approve_question(
        &self,
        question_id: &str,
        notes: Option<&str>,
    ) -> Result<Option<QuestionFingerprint>, DetectorError> {
        let question_id = required_id(question_id)?;
        let (removed, latest) = self.dequeue(question_id);

        let fingerprint = latest.map(|entry| {
            let fp = entry.fingerprint;
            self.store_fingerprint(fp.clone());
            fp
        });

        self.record_decision(
            &self.approvals,
            APPROVALS_KEY,
            AuditRecord {
                question_id: question_id.to_string(),
                decision: Decision::Approved,
                note: notes.map(str::to_string),
                queue_entries_removed: removed,
                decided_at: Utc::now(),
            },
        );
        info!(question_id, removed, fingerprinted = fingerprint.is_some(), "question_approved");
        Ok(fingerprint)
    }

    /// Rejects `question_id`: drops its review entries and records the
    /// rejection. Returns how many entries were removed.
    pub fn reject_question(
        &self,
        question_id: &str,
        reason: Option<&str>,
    ) -> Result<usize, DetectorError> {
        let question_id = required_id(question_id)?;
        let (removed, _) = self.dequeue(question_id);
        self.record_decision(
            &self.rejections,
            REJECTIONS_KEY,
            AuditRecord {
                question_id: question_id.to_string(),
                decision: Decision::Rejected,
                note: reason.map(str::to_string),
                queue_entries_removed: removed,
                decided_at: Utc::now(),
            },
        );
        info!(question_id, removed, "question_rejected");
        Ok(removed)
    }

    // Removes every entry for `id`; returns the count and the newest entry.
    fn dequeue(&self, id: &str) -> (usize, Option<ReviewQueueEntry>) {
        let mut queue = lock(&self.review_queue);
        self.reconcile_log(REVIEW_QUEUE_KEY, &mut *queue);
        let latest = queue.iter().filter(|e| e.candidate.id == id).last().cloned();
        let removed = queue.retain(|e| e.candidate.id != id);
        if removed > 0 {
            self.persist(REVIEW_QUEUE_KEY, &*queue);
        }
        (removed, latest)
    }

    fn record_decision(&self, log: &Mutex<BoundedLog<AuditRecord>>, key: &str, record: AuditRecord) {
        let mut log = lock(log);
        self.reconcile_log(key, &mut *log);
        log.push(record);
        self.persist(key, &*log);
    }

    /// Backfills fingerprints from `corpus` when the store is empty.
    ///
    /// Records that fail ingest or fingerprinting are skipped with a warning,
    /// as are topics that cannot be loaded. Returns the number added.
    pub fn initialize(&self, corpus: &dyn QuestionCorpus) -> Result<usize, DetectorError> {
        self.reconcile_fingerprints_locked();
        if !self.fingerprints.is_empty() {
            debug!(fingerprints = self.fingerprints.len(), "bootstrap_skipped");
            return Ok(0);
        }

        let start = Instant::now();
        let mut built = Vec::new();
        let mut skipped = 0usize;
        for topic in corpus.list_topics()? {
            let questions = match corpus.load_questions(&topic.id) {
                Ok(questions) => questions,
                Err(err) => {
                    warn!(topic = %topic.id, error = %err, "bootstrap_topic_failed");
                    continue;
                }
            };
            for raw in questions {
                let raw_id = raw.id.clone();
                let result = ingest_question(raw, &self.ingest_cfg)
                    .map_err(DetectorError::from)
                    .and_then(|q| self.engine.fingerprint(&q).map_err(DetectorError::from));
                match result {
                    Ok(fp) => built.push(fp),
                    Err(err) => {
                        skipped += 1;
                        warn!(topic = %topic.id, question_id = %raw_id, error = %err, "bootstrap_question_skipped");
                    }
                }
            }
        }

        let added = built.len();
        {
            let _writes = lock(&self.fingerprint_writes);
            self.reconcile_fingerprints();
            self.fingerprints.extend(built);
            self.persist(FINGERPRINTS_KEY, &self.fingerprints.to_map());
            lock(&self.cache).clear();
        }
        info!(
            added,
            skipped,
            elapsed_ms = start.elapsed().as_millis(),
            "corpus_bootstrap_complete"
        );
        Ok(added)
    }

    /// Fingerprint of `question` without storing it.
    pub fn generate_fingerprint(
        &self,
        question: &Question,
    ) -> Result<QuestionFingerprint, DetectorError> {
        Ok(self.engine.fingerprint(question)?)
    }

    pub fn compare_fingerprints(
        &self,
        a: &QuestionFingerprint,
        b: &QuestionFingerprint,
    ) -> SimilarityResult {
        self.engine.compare(a, b)
    }

    pub fn fingerprint(&self, question_id: &str) -> Option<Arc<QuestionFingerprint>> {
        self.fingerprints.get(question_id)
    }

    pub fn fingerprint_count(&self) -> usize {
        self.fingerprints.len()
    }

    /// Review entries, oldest first.
    pub fn review_queue(&self) -> Vec<ReviewQueueEntry> {
        lock(&self.review_queue).to_vec()
    }

    pub fn approvals(&self) -> Vec<AuditRecord> {
        lock(&self.approvals).to_vec()
    }

    pub fn rejections(&self) -> Vec<AuditRecord> {
        lock(&self.rejections).to_vec()
    }

    pub fn clear_caches(&self) {
        let mut cache = lock(&self.cache);
        let cleared = cache.len();
        cache.clear();
        debug!(cleared, "comparison_cache_cleared");
    }

    pub fn statistics(&self) -> DetectorStats {
        DetectorStats {
            fingerprints: self.fingerprints.len(),
            review_queue: lock(&self.review_queue).len(),
            approvals: lock(&self.approvals).len(),
            rejections: lock(&self.rejections).len(),
            cached_comparisons: lock(&self.cache).len(),
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if lock(&self.unloaded).contains(key) {
            warn!(key, "persist_skipped_unloaded");
            self.record_persist_failure(key);
            return;
        }
        let written = self
            .collections
            .save(key, value)
            .and_then(|()| self.collections.flush());
        if let Err(err) = written {
            warn!(key, error = %err, "persist_failure");
            self.record_persist_failure(key);
        }
    }

    fn record_persist_failure(&self, key: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_persist_failure(key);
        }
    }

    // Retries a collection that failed to load. `Some` once it reads cleanly;
    // the key is then writable again.
    fn reload<T: DeserializeOwned + Default>(&self, key: &str) -> Option<T> {
        let mut unloaded = lock(&self.unloaded);
        if !unloaded.contains(key) {
            return None;
        }
        match self.collections.load_or(key, T::default()) {
            Ok(value) => {
                unloaded.remove(key);
                info!(key, "collection_recovered");
                Some(value)
            }
            Err(err) => {
                debug!(key, error = %err, "collection_still_unreadable");
                None
            }
        }
    }

    // Caller holds `fingerprint_writes`. Ids added this session win.
    fn reconcile_fingerprints(&self) {
        let persisted = self.reload::<BTreeMap<String, QuestionFingerprint>>(FINGERPRINTS_KEY);
        if let Some(persisted) = persisted {
            let missing: Vec<_> = persisted
                .into_values()
                .filter(|fp| !self.fingerprints.contains(&fp.id))
                .collect();
            self.fingerprints.extend(missing);
            lock(&self.cache).clear();
        }
    }

    fn reconcile_fingerprints_locked(&self) {
        let _writes = lock(&self.fingerprint_writes);
        self.reconcile_fingerprints();
    }

    // Persisted entries go first, this session's entries after them.
    fn reconcile_log<T: DeserializeOwned + Clone>(&self, key: &str, log: &mut BoundedLog<T>) {
        if let Some(persisted) = self.reload::<Vec<T>>(key) {
            let mut merged = BoundedLog::from_vec(log.capacity(), persisted);
            for entry in log.iter().cloned() {
                merged.push(entry);
            }
            *log = merged;
        }
    }
}

fn required_id(id: &str) -> Result<&str, DetectorError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(DetectorError::InvalidInput(
            "question id must not be empty".into(),
        ));
    }
    Ok(id)
}

fn load_logged<T: DeserializeOwned + Default>(
    collections: &Collections,
    key: &str,
    unloaded: &mut HashSet<String>,
) -> T {
    collections.load_or(key, T::default()).unwrap_or_else(|err| {
        warn!(key, error = %err, "load_failure");
        unloaded.insert(key.to_string());
        T::default()
    })
}
