//! Fingerprint index: storage seam, vote-ranked lookup and persistence.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{load_snapshot, read_snapshot, save_snapshot, write_snapshot};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Fingerprint, ImageId};
use crate::error::{Error, Result};

/// Storage seam for the inverted fingerprint index.
///
/// Backends may fail per call (a remote store losing its connection, a
/// corrupt file); the in-process [`MemoryStore`] never does, but the seam
/// keeps the failure path uniform.
pub trait FingerprintStore {
    /// Associate an image with a fingerprint.
    ///
    /// Returns whether the association is new; re-adding an existing pair
    /// is a no-op.
    fn add(&mut self, fingerprint: Fingerprint, id: &str) -> Result<bool>;

    /// All images associated with a fingerprint, in stable order.
    ///
    /// Unknown fingerprints yield an empty list.
    fn members(&self, fingerprint: Fingerprint) -> Result<Vec<ImageId>>;
}

/// Configuration for index batching
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Fingerprints per insert batch (default 100_000)
    pub chunk_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { chunk_size: 100_000 }
    }
}

impl IndexConfig {
    /// Set the insert batch size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validate parameters, rejecting caller misuse eagerly
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// One ranked lookup candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Image identifier
    pub id: ImageId,
    /// Number of query fingerprints the image shares
    pub votes: usize,
}

/// Vote-ranked similarity index over a fingerprint store.
///
/// Inserts batch their fingerprints in fixed-size chunks; lookups tally
/// one vote per query fingerprint per holding image and rank candidates
/// by votes descending, identifier ascending on ties.
#[derive(Debug, Clone)]
pub struct SimilarityIndex<S = MemoryStore> {
    store: S,
    config: IndexConfig,
}

impl SimilarityIndex<MemoryStore> {
    /// Index over a fresh in-process store.
    pub fn new(config: IndexConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl<S: FingerprintStore> SimilarityIndex<S> {
    /// Index over an existing store (for example one loaded from a
    /// snapshot).
    pub fn with_store(store: S, config: IndexConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Associate every fingerprint with the image, in batches.
    ///
    /// Returns the number of new associations; fingerprints the image
    /// already holds count zero.
    pub fn insert(&mut self, id: &str, fingerprints: &[Fingerprint]) -> Result<usize> {
        let mut added = 0;
        for chunk in fingerprints.chunks(self.config.chunk_size) {
            for fingerprint in chunk {
                if self.store.add(*fingerprint, id)? {
                    added += 1;
                }
            }
        }
        log::debug!(
            "indexed {} fingerprints for {} ({} new)",
            fingerprints.len(),
            id,
            added
        );
        Ok(added)
    }

    /// Rank every image sharing at least one query fingerprint.
    ///
    /// Each query fingerprint contributes one vote to every image holding
    /// it; a fingerprint repeated in the query votes repeatedly. Results
    /// are ordered by votes descending, then identifier ascending.
    pub fn lookup(&self, fingerprints: &[Fingerprint]) -> Result<Vec<Match>> {
        let mut votes: HashMap<ImageId, usize> = HashMap::new();
        for fingerprint in fingerprints {
            for id in self.store.members(*fingerprint)? {
                *votes.entry(id).or_insert(0) += 1;
            }
        }

        let mut matches: Vec<Match> = votes
            .into_iter()
            .map(|(id, votes)| Match { id, votes })
            .collect();
        matches.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }
}
