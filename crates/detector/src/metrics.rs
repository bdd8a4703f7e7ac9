// Metrics hooks for the detector.
//
// A `DetectorMetrics` implementation is handed to a detector with
// `DuplicateDetector::with_metrics`; each detector reports to its own
// recorder, so tests can observe one detector in isolation.
use std::time::Duration;

use crate::types::ReportStatus;

/// Observer for detector activity.
pub trait DetectorMetrics: Send + Sync {
    /// Record a finished duplicate check.
    ///
    /// `latency` covers fingerprinting, comparison and queueing; `duplicates`
    /// is the number of surfaced matches.
    fn record_check(&self, status: ReportStatus, latency: Duration, duplicates: usize);

    /// Record a collection that could not be written back.
    fn record_persist_failure(&self, _key: &str) {}
}
