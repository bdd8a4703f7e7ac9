//! YAML configuration file support.
//!
//! One file configures every stage: ingest defaults, similarity weights,
//! detector thresholds and capacities, and the store backend. Every section
//! is optional and falls back to its defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "mblex practice bank"
//!
//! ingest:
//!   default_language: "en"
//!   default_difficulty: "medium"
//!   min_options: 2
//!   max_options: 6
//!
//! similarity:
//!   max_keywords: 10
//!   weights:
//!     text: 0.30
//!     semantic: 0.25
//!     structural: 0.15
//!     options: 0.15
//!     keyword: 0.10
//!     answer_pattern: 0.05
//!   extra_concepts: ["trigger point", "effleurage"]
//!
//! detector:
//!   thresholds:
//!     exact_match: 1.0
//!     high_similarity: 0.85
//!     moderate_similarity: 0.65
//!     low_similarity: 0.45
//!   review_queue_capacity: 100
//!   audit_log_capacity: 500
//!   use_parallel: true
//!
//! store:
//!   backend:
//!     backend: "redb"
//!     path: "/var/lib/qbank/qbank.redb"
//!   compression:
//!     codec: "zstd"
//!     level: 3
//! ```

use std::fs;
use std::path::Path;

use detector::{DetectorConfig, DuplicateDetector};
use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use similarity::SimilarityConfig;
use store::{BackendConfig, Collections, CompressionConfig};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("failed to build detector: {0}")]
    Build(#[from] detector::DetectorError),
}

/// Store section: where collections live and how they are compressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreYamlConfig {
    pub backend: BackendConfig,
    pub compression: CompressionConfig,
}

/// Top-level YAML configuration for the whole question-bank gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QbankConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub store: StoreYamlConfig,
}

impl QbankConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: QbankConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.similarity
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("similarity: {e}")))?;
        self.detector
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("detector: {e}")))?;
        self.store
            .compression
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("store: {e}")))?;
        if let BackendConfig::Redb { path } = &self.store.backend {
            if path.trim().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "store: redb path must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Opens the configured backend and builds a detector over it.
    pub fn build_detector(&self) -> Result<DuplicateDetector, ConfigLoadError> {
        let backend = self
            .store
            .backend
            .build()
            .map_err(detector::DetectorError::from)?;
        let collections = Collections::new(backend, self.store.compression);
        let detector = DuplicateDetector::new(
            self.detector.clone(),
            self.similarity.clone(),
            collections,
        )?
        .with_ingest_config(self.ingest.clone())?;
        info!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            backend = ?self.store.backend,
            "detector_built"
        );
        Ok(detector)
    }
}

impl Default for QbankConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            ingest: IngestConfig::default(),
            similarity: SimilarityConfig::default(),
            detector: DetectorConfig::default(),
            store: StoreYamlConfig::default(),
        }
    }
}
