use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use similarity::QuestionFingerprint;

/// In-memory id → fingerprint map shared between checks and approvals.
///
/// Readers take a [`snapshot`](Self::snapshot) and compare against it without
/// holding the lock; writers serialize on the write lock. Fingerprints are
/// immutable, so sharing them behind `Arc` is enough for a consistent view.
#[derive(Debug, Default)]
pub struct FingerprintStore {
    inner: RwLock<HashMap<String, Arc<QuestionFingerprint>>>,
}

impl FingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, QuestionFingerprint>) -> Self {
        let store = Self::new();
        store.extend(map.into_values());
        store
    }

    /// Current fingerprints ordered by id.
    pub fn snapshot(&self) -> Vec<Arc<QuestionFingerprint>> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<_> = guard.values().cloned().collect();
        drop(guard);
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Inserts `fingerprint`, replacing and returning any previous one with
    /// the same id.
    pub fn insert(&self, fingerprint: QuestionFingerprint) -> Option<Arc<QuestionFingerprint>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint.id.clone(), Arc::new(fingerprint))
    }

    pub fn extend<I>(&self, fingerprints: I)
    where
        I: IntoIterator<Item = QuestionFingerprint>,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for fp in fingerprints {
            guard.insert(fp.id.clone(), Arc::new(fp));
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<QuestionFingerprint>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owned, id-ordered copy for persisting.
    pub fn to_map(&self) -> BTreeMap<String, QuestionFingerprint> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, fp)| (id.clone(), fp.as_ref().clone()))
            .collect()
    }
}
