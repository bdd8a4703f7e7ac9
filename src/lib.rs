//! Workspace umbrella crate for exam-question duplicate detection.
//!
//! This crate stitches ingest validation and the duplicate gate together so
//! callers can submit a loosely typed question record with a single call.

pub mod config;

pub use canonical::{
    extract_keywords, hash_set_digest, normalize_text, rolling_hash32, text_digest, tokenize,
    NORMALIZATION_VERSION,
};
pub use detector::{
    AuditRecord, Classification, CorpusError, Decision, DetectorConfig, DetectorError,
    DetectorMetrics, DetectorStats, DuplicateDetector, DuplicateMatch, DuplicateReport,
    InMemoryCorpus, QuestionCorpus, ReportStatus, ReviewQueueEntry, Thresholds, Topic,
};
pub use ingest::{
    ingest_json, ingest_question, IngestConfig, IngestError, Question, QuestionOption,
    RawOption, RawQuestion, RawScalar,
};
pub use similarity::{
    compare_fingerprints, fingerprint_question, FingerprintError, QuestionFingerprint,
    ScoreWeights, SimilarityConfig, SimilarityEngine, SimilarityResult, StructuralWeights,
};
pub use store::{BackendConfig, Collections, CompressionCodec, CompressionConfig, StoreError};

pub use crate::config::{ConfigLoadError, QbankConfig};

use std::error::Error;
use std::fmt;

use tracing::{debug, warn};

/// Errors from turning a submitted record into a duplicate report.
#[derive(Debug)]
pub enum PipelineError {
    Ingest(IngestError),
    Detector(DetectorError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Ingest(err) => write!(f, "ingest failure: {err}"),
            PipelineError::Detector(err) => write!(f, "detector failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Ingest(err) => Some(err),
            PipelineError::Detector(err) => Some(err),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}

impl From<DetectorError> for PipelineError {
    fn from(value: DetectorError) -> Self {
        PipelineError::Detector(value)
    }
}

/// Validate a submitted record and check it for duplicates.
///
/// A record that fails ingest never reaches the detector. Once ingested, the
/// check itself cannot fail; internal problems come back as an error report.
pub fn submit_question(
    raw: RawQuestion,
    ingest_cfg: &IngestConfig,
    detector: &DuplicateDetector,
) -> Result<DuplicateReport, PipelineError> {
    let question = ingest_question(raw, ingest_cfg)?;
    let report = detector.check_for_duplicates(&question);
    debug!(
        question_id = %question.id,
        status = report.status.as_str(),
        "submission_checked"
    );
    Ok(report)
}

/// [`submit_question`] for a JSON-encoded record.
pub fn submit_json(
    json: &str,
    ingest_cfg: &IngestConfig,
    detector: &DuplicateDetector,
) -> Result<DuplicateReport, PipelineError> {
    let question = ingest_json(json, ingest_cfg)?;
    Ok(detector.check_for_duplicates(&question))
}

/// Ingest a reviewed record and add it straight to the fingerprint store.
pub fn add_to_bank(
    raw: RawQuestion,
    ingest_cfg: &IngestConfig,
    detector: &DuplicateDetector,
) -> Result<QuestionFingerprint, PipelineError> {
    let question = ingest_question(raw, ingest_cfg)?;
    Ok(detector.add_approved_question(&question)?)
}

/// Small kinesiology and hygiene bank used by the demo binary and benches.
pub fn demo_corpus() -> InMemoryCorpus {
    const DEMO_BANK: &str = include_str!("../demos/demo_bank.json");
    corpus_or_empty(DEMO_BANK)
}

fn corpus_or_empty(json: &str) -> InMemoryCorpus {
    InMemoryCorpus::from_json(json).unwrap_or_else(|err| {
        warn!(error = %err, "demo_corpus_invalid");
        InMemoryCorpus::default()
    })
}
