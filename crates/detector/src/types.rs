//! Reports, review entries, audit records and errors.

use chrono::{DateTime, Utc};
use ingest::{IngestError, Question};
use serde::{Deserialize, Serialize};
use similarity::{FingerprintError, QuestionFingerprint, SimilarityResult};
use store::StoreError;
use thiserror::Error;

use crate::corpus::CorpusError;

/// Recommendation attached to every error report.
pub const ANALYSIS_ERROR_RECOMMENDATION: &str = "Manual review required due to analysis error";

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Clear,
    Warning,
    Blocked,
    Error,
}

impl ReportStatus {
    /// Warning and blocked reports go to the review queue.
    pub fn needs_review(self) -> bool {
        matches!(self, ReportStatus::Warning | ReportStatus::Blocked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Clear => "clear",
            ReportStatus::Warning => "warning",
            ReportStatus::Blocked => "blocked",
            ReportStatus::Error => "error",
        }
    }
}

/// How close a compared pair is, least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    None,
    Low,
    Moderate,
    High,
    Exact,
}

/// One stored question that resembles the candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateMatch {
    pub question_id: String,
    pub similarity: SimilarityResult,
    pub classification: Classification,
    /// Human-readable explanation of which components matched.
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDetails {
    /// Fingerprints in the store when the check ran.
    pub corpus_size: usize,
    /// Fingerprints compared, i.e. the corpus minus the candidate itself.
    pub candidates_compared: usize,
    /// Comparisons came from the cache.
    pub cache_hit: bool,
    pub analyzed_at: DateTime<Utc>,
}

/// Result of one duplicate check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateReport {
    pub candidate_id: String,
    pub status: ReportStatus,
    /// Surfaced matches, highest overall score first.
    pub duplicates: Vec<DuplicateMatch>,
    pub recommendations: Vec<String>,
    /// Top overall score when there are duplicates, 1.0 when clear of any,
    /// 0.0 for an error report.
    pub confidence: f64,
    pub analysis: AnalysisDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DuplicateReport {
    /// Report for a check that failed internally.
    pub fn analysis_error(candidate_id: &str, corpus_size: usize, message: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.to_string(),
            status: ReportStatus::Error,
            duplicates: Vec::new(),
            recommendations: vec![ANALYSIS_ERROR_RECOMMENDATION.to_string()],
            confidence: 0.0,
            analysis: AnalysisDetails {
                corpus_size,
                candidates_compared: 0,
                cache_hit: false,
                analyzed_at: Utc::now(),
            },
            error: Some(message.into()),
        }
    }

    /// Best match, if any.
    pub fn top_match(&self) -> Option<&DuplicateMatch> {
        self.duplicates.first()
    }
}

/// A candidate waiting for a human decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewQueueEntry {
    pub candidate: Question,
    pub fingerprint: QuestionFingerprint,
    /// Snapshot taken when the entry was queued; later reports never alias it.
    pub report: DuplicateReport,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// One approve or reject action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    pub question_id: String,
    pub decision: Decision,
    /// Reviewer notes on approval, reason on rejection.
    #[serde(default)]
    pub note: Option<String>,
    /// Review entries removed by this action.
    pub queue_entries_removed: usize,
    pub decided_at: DateTime<Utc>,
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DetectorStats {
    pub fingerprints: usize,
    pub review_queue: usize,
    pub approvals: usize,
    pub rejections: usize,
    pub cached_comparisons: usize,
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid detector config: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
}
