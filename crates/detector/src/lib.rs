//! # Duplicate gate (`detector`)
//!
//! ## Purpose
//!
//! `detector` sits on top of the similarity engine (`similarity`) and the
//! persisted collections (`store`). It checks a candidate question against
//! every stored fingerprint, classifies each surfaced pair, and decides
//! whether the candidate is clear, needs review, or is blocked.
//!
//! Warning and blocked candidates land in a bounded review queue. A reviewer
//! then approves (the candidate's fingerprint joins the store) or rejects it;
//! both actions are recorded in bounded audit logs.
//!
//! ## Core Types
//!
//! - [`DuplicateDetector`]: owns the store, the comparison cache, the review
//!   queue and the audit logs.
//! - [`DetectorConfig`] / [`Thresholds`]: classification thresholds and
//!   capacities.
//! - [`DuplicateReport`]: status, matches with reasons, recommendations and
//!   confidence for one check.
//! - [`QuestionCorpus`]: source of the existing bank, used once to backfill
//!   an empty store.
//! - [`DetectorMetrics`]: optional observer for checks and write failures.
//!
//! ## Example Usage
//!
//! ```
//! use detector::{DuplicateDetector, ReportStatus};
//! use ingest::{Question, QuestionOption};
//!
//! let detector = DuplicateDetector::in_memory().unwrap();
//! let question = Question {
//!     id: "q-1".into(),
//!     question: "Which muscle is the prime mover for elbow flexion?".into(),
//!     options: ["Biceps brachii", "Triceps brachii", "Deltoid"]
//!         .into_iter()
//!         .map(QuestionOption::new)
//!         .collect(),
//!     correct: 0,
//!     category_id: "kinesiology".into(),
//!     difficulty: "medium".into(),
//!     image: None,
//!     language: "en".into(),
//! };
//! detector.add_approved_question(&question).unwrap();
//!
//! let copy = Question { id: "q-2".into(), ..question };
//! let report = detector.check_for_duplicates(&copy);
//! assert_eq!(report.status, ReportStatus::Blocked);
//! assert_eq!(detector.review_queue().len(), 1);
//! ```
//!
//! ## Concurrency
//!
//! Checks compare against a snapshot of the store and may run from many
//! threads. Fingerprint inserts, queue pushes and audit appends each hold
//! their collection's lock while writing it back, so persisted state follows
//! the in-memory order.

mod config;
mod corpus;
mod engine;
mod metrics;
mod report;
mod types;

pub use crate::config::{DetectorConfig, Thresholds, CLASSIFICATION_EPSILON};
pub use crate::corpus::{CorpusError, InMemoryCorpus, QuestionCorpus, Topic};
pub use crate::engine::DuplicateDetector;
pub use crate::metrics::DetectorMetrics;
pub use crate::report::{aggregate_status, build_matches, reasons_for, recommendations_for};
pub use crate::types::{
    AnalysisDetails, AuditRecord, Classification, Decision, DetectorError, DetectorStats,
    DuplicateMatch, DuplicateReport, ReportStatus, ReviewQueueEntry,
    ANALYSIS_ERROR_RECOMMENDATION,
};
