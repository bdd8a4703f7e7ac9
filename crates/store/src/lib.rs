//! # Question store
//!
//! Persistence for the duplicate detector. Four collections live behind a
//! plain key-value collaborator:
//!
//! | key | contents |
//! |-----|----------|
//! | [`FINGERPRINTS_KEY`] | id → fingerprint map |
//! | [`REVIEW_QUEUE_KEY`] | review queue, oldest first |
//! | [`APPROVALS_KEY`] | approval audit log |
//! | [`REJECTIONS_KEY`] | rejection audit log |
//!
//! Each collection is serialized as JSON, compressed (Zstd by default) and
//! written back whole after every mutation. There are no cross-collection
//! transactions; each collection is independent.
//!
//! Also here: [`FingerprintStore`], the lock-protected in-memory map checks
//! take snapshots of, and [`BoundedLog`], the capped FIFO used for the
//! review queue and audit logs.
//!
//! ```
//! use store::{BackendConfig, Collections, CompressionConfig, APPROVALS_KEY};
//!
//! let collections = Collections::new(
//!     BackendConfig::in_memory().build().unwrap(),
//!     CompressionConfig::default(),
//! );
//! let empty: Vec<String> = collections.load_or(APPROVALS_KEY, Vec::new()).unwrap();
//! assert!(empty.is_empty());
//!
//! collections.save(APPROVALS_KEY, &vec!["q1".to_string()]).unwrap();
//! let loaded: Vec<String> = collections.load_or(APPROVALS_KEY, Vec::new()).unwrap();
//! assert_eq!(loaded, vec!["q1"]);
//! ```

mod backend;
mod bounded;
mod compression;
mod fingerprints;

pub use crate::backend::{BackendConfig, InMemoryBackend, KeyValueStore};
#[cfg(feature = "backend-redb")]
pub use crate::backend::RedbBackend;
pub use crate::bounded::BoundedLog;
pub use crate::compression::{CompressionCodec, CompressionConfig};
pub use crate::fingerprints::FingerprintStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const FINGERPRINTS_KEY: &str = "question-fingerprints";
pub const REVIEW_QUEUE_KEY: &str = "duplicate-review-queue";
pub const APPROVALS_KEY: &str = "question-approvals";
pub const REJECTIONS_KEY: &str = "question-rejections";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("encode error for {key}: {message}")]
    Encode { key: String, message: String },
    #[error("decode error for {key}: {message}")]
    Decode { key: String, message: String },
    #[error("compression error: {0}")]
    Compression(String),
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Compression(e.to_string())
    }
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Typed, compressed access to the persisted collections.
pub struct Collections {
    backend: Box<dyn KeyValueStore>,
    compression: CompressionConfig,
}

impl Collections {
    pub fn new(backend: Box<dyn KeyValueStore>, compression: CompressionConfig) -> Self {
        Self {
            backend,
            compression,
        }
    }

    /// In-memory backend with default compression.
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryBackend::new()), CompressionConfig::default())
    }

    pub fn compression(&self) -> &CompressionConfig {
        &self.compression
    }

    /// Loads the collection under `key`, or `default` when nothing is stored.
    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(default);
        };
        let bytes = self.compression.decompress(&raw)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Writes `value` back as the whole collection under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let packed = self.compression.compress(&bytes)?;
        self.backend.set(key, &packed)?;
        debug!(
            key,
            raw_bytes = bytes.len(),
            stored_bytes = packed.len(),
            "collection_saved"
        );
        Ok(())
    }

    /// Flushes buffered backend writes.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.backend.flush()
    }
}
