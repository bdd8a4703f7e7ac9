//! Configuration for question ingest.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Controls validation bounds and the defaults applied to optional fields.
///
/// ```rust
/// use ingest::IngestConfig;
///
/// let cfg = IngestConfig::default().with_default_language("es");
/// assert_eq!(cfg.min_options, 2);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Configuration schema version; 0 is reserved and rejected.
    pub version: u32,
    /// Fewest options a question may have.
    pub min_options: usize,
    /// Most options a question may have.
    pub max_options: usize,
    /// Remove control characters from every text field.
    pub strip_control_chars: bool,
    /// Language applied when the record has none.
    pub default_language: String,
    /// Difficulty applied when the record has none.
    pub default_difficulty: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            version: 1,
            min_options: 2,
            max_options: 8,
            strip_control_chars: true,
            default_language: "en".to_string(),
            default_difficulty: "medium".to_string(),
        }
    }
}

impl IngestConfig {
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_default_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.default_difficulty = difficulty.into();
        self
    }

    pub fn with_option_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_options = min;
        self.max_options = max;
        self
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.version == 0 {
            return Err(IngestError::InvalidConfig("version must be >= 1".into()));
        }
        if self.min_options == 0 {
            return Err(IngestError::InvalidConfig(
                "min_options must be >= 1".into(),
            ));
        }
        if self.max_options < self.min_options {
            return Err(IngestError::InvalidConfig(format!(
                "max_options ({}) must be >= min_options ({})",
                self.max_options, self.min_options
            )));
        }
        if self.default_language.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "default_language must not be empty".into(),
            ));
        }
        if self.default_difficulty.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "default_difficulty must not be empty".into(),
            ));
        }
        Ok(())
    }
}
