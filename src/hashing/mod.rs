//! Perceptual hashing of triangle content under affine canonicalization.

pub mod canonical;
pub mod dct;

pub use canonical::{fingerprint_triangle, TriangleHasher, PATCH_HEIGHT, PATCH_WIDTH};
pub use dct::{PatchHasher, BLOCK_SIZE, PATCH_SIZE};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hash geometry parameters.
///
/// `hash_size` is the side length of the retained low-frequency
/// coefficient block, `patch_size` the side length of the square analysis
/// patch the warped triangle is shrunk to before the transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Retained coefficient block side length (bits per axis)
    pub hash_size: usize,
    /// Analysis patch side length in pixels
    pub patch_size: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            hash_size: BLOCK_SIZE,
            patch_size: PATCH_SIZE,
        }
    }
}

impl HasherConfig {
    pub fn with_hash_size(mut self, hash_size: usize) -> Self {
        self.hash_size = hash_size;
        self
    }

    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    /// Check the parameters, rejecting caller misuse before any hashing
    /// happens.
    ///
    /// The block must be non-empty, fit the 64-bit fingerprint layout and
    /// fit inside the analysis patch.
    pub fn validate(&self) -> Result<()> {
        if self.hash_size == 0 {
            return Err(Error::Config("hash_size must be positive".into()));
        }
        if self.hash_size > BLOCK_SIZE {
            return Err(Error::Config(format!(
                "hash_size {} exceeds the {} bits per axis a 64-bit fingerprint holds",
                self.hash_size, BLOCK_SIZE
            )));
        }
        if self.patch_size < self.hash_size {
            return Err(Error::Config(format!(
                "patch_size {} is smaller than hash_size {}",
                self.patch_size, self.hash_size
            )));
        }
        Ok(())
    }
}
