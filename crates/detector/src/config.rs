use serde::{Deserialize, Serialize};

use crate::types::{Classification, DetectorError};

/// Slack applied when comparing a score against a threshold, so a pair whose
/// components are all 1.0 still reaches `exact_match` after float summation.
pub const CLASSIFICATION_EPSILON: f64 = 1e-9;

/// Score thresholds for classifying a compared pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    pub exact_match: f64,
    pub high_similarity: f64,
    pub moderate_similarity: f64,
    /// Pairs below this are unrelated: not reported and not cached.
    pub low_similarity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            exact_match: 1.0,
            high_similarity: 0.85,
            moderate_similarity: 0.65,
            low_similarity: 0.45,
        }
    }
}

impl Thresholds {
    /// Classification of `score`. Monotonic: a higher score never yields a
    /// less severe classification.
    ///
    /// ```
    /// use detector::{Classification, Thresholds};
    ///
    /// let t = Thresholds::default();
    /// assert_eq!(t.classify(0.5), Classification::Low);
    /// assert_eq!(t.classify(0.7), Classification::Moderate);
    /// assert_eq!(t.classify(0.9), Classification::High);
    /// assert_eq!(t.classify(1.0), Classification::Exact);
    /// assert_eq!(t.classify(0.1), Classification::None);
    /// ```
    pub fn classify(&self, score: f64) -> Classification {
        let reaches = |threshold: f64| score + CLASSIFICATION_EPSILON >= threshold;
        if reaches(self.exact_match) {
            Classification::Exact
        } else if reaches(self.high_similarity) {
            Classification::High
        } else if reaches(self.moderate_similarity) {
            Classification::Moderate
        } else if reaches(self.low_similarity) {
            Classification::Low
        } else {
            Classification::None
        }
    }

    /// Whether a pair with `score` is surfaced at all.
    pub fn surfaces(&self, score: f64) -> bool {
        self.classify(score) != Classification::None
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        let ordered = [
            ("exact_match", self.exact_match),
            ("high_similarity", self.high_similarity),
            ("moderate_similarity", self.moderate_similarity),
            ("low_similarity", self.low_similarity),
        ];
        for (name, value) in ordered {
            if !(0.0..=1.0).contains(&value) {
                return Err(DetectorError::InvalidConfig(format!(
                    "thresholds.{name} must be within [0.0, 1.0] (got {value})"
                )));
            }
        }
        for pair in ordered.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            if upper.1 < lower.1 {
                return Err(DetectorError::InvalidConfig(format!(
                    "thresholds.{} ({}) must be >= thresholds.{} ({})",
                    upper.0, upper.1, lower.0, lower.1
                )));
            }
        }
        Ok(())
    }
}

/// Detector behaviour and bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Configuration schema version.
    pub version: u32,
    pub thresholds: Thresholds,
    /// Most recent review entries kept.
    pub review_queue_capacity: usize,
    /// Most recent records kept in each of the approval and rejection logs.
    pub audit_log_capacity: usize,
    /// Compare against the corpus with rayon.
    pub use_parallel: bool,
    /// Reuse comparison lists for re-checked identical candidates.
    pub cache_enabled: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            thresholds: Thresholds::default(),
            review_queue_capacity: 100,
            audit_log_capacity: 500,
            use_parallel: false,
            cache_enabled: true,
        }
    }
}

impl DetectorConfig {
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_review_queue_capacity(mut self, capacity: usize) -> Self {
        self.review_queue_capacity = capacity;
        self
    }

    pub fn with_audit_log_capacity(mut self, capacity: usize) -> Self {
        self.audit_log_capacity = capacity;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_cache(mut self, cache_enabled: bool) -> Self {
        self.cache_enabled = cache_enabled;
        self
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.version == 0 {
            return Err(DetectorError::InvalidConfig("version must be >= 1".into()));
        }
        if self.review_queue_capacity == 0 {
            return Err(DetectorError::InvalidConfig(
                "review_queue_capacity must be >= 1".into(),
            ));
        }
        if self.audit_log_capacity == 0 {
            return Err(DetectorError::InvalidConfig(
                "audit_log_capacity must be >= 1".into(),
            ));
        }
        self.thresholds.validate()
    }
}
