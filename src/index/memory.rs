//! In-process fingerprint store backed by ordered maps.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{Fingerprint, ImageId};
use crate::error::Result;
use crate::index::FingerprintStore;

/// Inverted index from fingerprint to the set of images containing it.
///
/// Ordered maps keep iteration, membership listing and snapshot layout
/// deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<Fingerprint, BTreeSet<ImageId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct fingerprints stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of fingerprint-to-image associations
    pub fn association_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Iterate entries in ascending fingerprint order.
    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &BTreeSet<ImageId>)> {
        self.entries.iter()
    }
}

impl FingerprintStore for MemoryStore {
    fn add(&mut self, fingerprint: Fingerprint, id: &str) -> Result<bool> {
        Ok(self
            .entries
            .entry(fingerprint)
            .or_default()
            .insert(id.to_string()))
    }

    fn members(&self, fingerprint: Fingerprint) -> Result<Vec<ImageId>> {
        Ok(self
            .entries
            .get(&fingerprint)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default())
    }
}
