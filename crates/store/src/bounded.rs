use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// FIFO log that keeps only the most recent `capacity` entries.
///
/// ```
/// use store::BoundedLog;
///
/// let mut log = BoundedLog::new(2);
/// log.push(1);
/// log.push(2);
/// assert_eq!(log.push(3), Some(1));
/// assert_eq!(log.to_vec(), vec![2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Rebuilds a log from persisted entries, oldest first. Entries beyond
    /// `capacity` are dropped from the front.
    pub fn from_vec(capacity: usize, entries: Vec<T>) -> Self {
        let mut log = Self::new(capacity);
        for entry in entries {
            log.push(entry);
        }
        log
    }

    /// Appends `entry` and returns the evicted oldest entry, if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Keeps entries for which `keep` returns true; returns how many were removed.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(keep);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Entries oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedLog<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

/// Deserializes as an unbounded list; callers re-cap with [`BoundedLog::from_vec`].
impl<'de, T: Deserialize<'de>> Deserialize<'de> for BoundedLog<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<T>::deserialize(deserializer)?;
        let capacity = entries.len();
        Ok(Self::from_vec(capacity, entries))
    }
}
