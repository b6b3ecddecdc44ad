//! Frequency-domain fingerprint of a canonical patch.
//!
//! # Algorithm
//!
//! 1. Take the grayscale analysis patch as a real-valued matrix.
//! 2. Apply the orthonormal 2D DCT-II, keeping only the top-left
//!    `hash_size` x `hash_size` block of coefficients (the low-frequency
//!    structure).
//! 3. Zero the DC coefficient, then compare every coefficient of the
//!    block against the block mean.
//! 4. Pack the comparison bits into a [`Fingerprint`].
//!
//! With the default 8x8 block over a 32x32 patch only 8 of the 32 output
//! frequencies per axis are ever used, so the transform multiplies by a
//! precomputed truncated slice of the DCT basis instead of running full
//! 32-point transforms.

use image::GrayImage;

use crate::core::Fingerprint;
use crate::hashing::HasherConfig;

/// Default side length of the analysis patch fed to the transform
pub const PATCH_SIZE: usize = 32;

/// Side length of the fingerprint bit grid; also the default and the
/// largest usable `hash_size`
pub const BLOCK_SIZE: usize = 8;

/// Perceptual hasher over analysis patches.
///
/// Holds the truncated DCT basis for one hash geometry, built once at
/// construction; hashing a patch is then two small matrix products and a
/// comparison pass.
#[derive(Debug, Clone)]
pub struct PatchHasher {
    hash_size: usize,
    patch_size: usize,
    /// Rows 0..hash_size of the orthonormal patch_size-point DCT-II
    /// basis, row-major
    basis: Vec<f64>,
}

impl Default for PatchHasher {
    fn default() -> Self {
        Self::new(HasherConfig::default())
    }
}

impl PatchHasher {
    /// Build the hasher for a validated config, precomputing the
    /// truncated cosine basis.
    pub fn new(config: HasherConfig) -> Self {
        let n = config.patch_size as f64;
        let mut basis = vec![0.0; config.hash_size * config.patch_size];
        for k in 0..config.hash_size {
            let scale = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            for i in 0..config.patch_size {
                let angle = std::f64::consts::PI * (2 * i + 1) as f64 * k as f64 / (2.0 * n);
                basis[k * config.patch_size + i] = scale * angle.cos();
            }
        }
        Self {
            hash_size: config.hash_size,
            patch_size: config.patch_size,
            basis,
        }
    }

    /// Side length of the analysis patch this hasher expects.
    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    fn basis_row(&self, k: usize) -> &[f64] {
        &self.basis[k * self.patch_size..(k + 1) * self.patch_size]
    }

    /// Low-frequency DCT coefficient block of a grayscale patch,
    /// row-major `hash_size` x `hash_size`.
    ///
    /// Computes `B * X * B^T` where `B` is the truncated basis.
    pub fn dct_block(&self, patch: &GrayImage) -> Vec<f64> {
        debug_assert_eq!(
            patch.dimensions(),
            (self.patch_size as u32, self.patch_size as u32)
        );

        // Rows first: partial[k][col] = sum_n B[k][n] * X[n][col].
        let mut partial = vec![0.0; self.hash_size * self.patch_size];
        for k in 0..self.hash_size {
            let row = self.basis_row(k);
            for col in 0..self.patch_size {
                let mut acc = 0.0;
                for (n, &w) in row.iter().enumerate() {
                    acc += w * patch.get_pixel(col as u32, n as u32).0[0] as f64;
                }
                partial[k * self.patch_size + col] = acc;
            }
        }

        // Then columns: block[k][l] = sum_col partial[k][col] * B[l][col].
        let mut block = vec![0.0; self.hash_size * self.hash_size];
        for k in 0..self.hash_size {
            for (l, slot) in block[k * self.hash_size..(k + 1) * self.hash_size]
                .iter_mut()
                .enumerate()
            {
                let row = self.basis_row(l);
                let mut acc = 0.0;
                for (col, &w) in row.iter().enumerate() {
                    acc += partial[k * self.patch_size + col] * w;
                }
                *slot = acc;
            }
        }
        block
    }

    /// Fingerprint of a grayscale patch.
    ///
    /// The DC coefficient is zeroed before the mean is taken, so overall
    /// patch brightness never influences the comparison threshold. Blocks
    /// smaller than 8x8 occupy the low-index rows and columns of the bit
    /// grid; the rest stay zero.
    pub fn fingerprint(&self, patch: &GrayImage) -> Fingerprint {
        let mut block = self.dct_block(patch);
        block[0] = 0.0;

        let mean = block.iter().sum::<f64>() / block.len() as f64;

        let mut bits = [[false; BLOCK_SIZE]; BLOCK_SIZE];
        for r in 0..self.hash_size {
            for c in 0..self.hash_size {
                bits[r][c] = block[r * self.hash_size + c] > mean;
            }
        }
        Fingerprint::from_bits(&bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    /// Patch with a deterministic mixed-frequency pattern.
    fn textured_patch(size: usize) -> GrayImage {
        GrayImage::from_fn(size as u32, size as u32, |x, y| {
            Luma([((x * 31 + y * 17 + (x * y) / 3) % 256) as u8])
        })
    }

    fn gradient_patch(horizontal: bool) -> GrayImage {
        GrayImage::from_fn(PATCH_SIZE as u32, PATCH_SIZE as u32, |x, y| {
            let t = if horizontal { x } else { y };
            Luma([(t * 6) as u8])
        })
    }

    #[test]
    fn test_basis_rows_orthonormal() {
        let hasher = PatchHasher::default();
        for k in 0..BLOCK_SIZE {
            for l in 0..BLOCK_SIZE {
                let dot: f64 = hasher
                    .basis_row(k)
                    .iter()
                    .zip(hasher.basis_row(l))
                    .map(|(a, b)| a * b)
                    .sum();
                let expected = if k == l { 1.0 } else { 0.0 };
                assert_relative_eq!(dot, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_block_matches_direct_transform() {
        let hasher = PatchHasher::default();
        let patch = textured_patch(PATCH_SIZE);
        let block = hasher.dct_block(&patch);

        let n = PATCH_SIZE as f64;
        for k in 0..BLOCK_SIZE {
            for l in 0..BLOCK_SIZE {
                let sk = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                let sl = if l == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                let mut direct = 0.0;
                for y in 0..PATCH_SIZE {
                    for x in 0..PATCH_SIZE {
                        let v = patch.get_pixel(x as u32, y as u32).0[0] as f64;
                        direct += v
                            * (std::f64::consts::PI * (2 * y + 1) as f64 * k as f64 / (2.0 * n))
                                .cos()
                            * (std::f64::consts::PI * (2 * x + 1) as f64 * l as f64 / (2.0 * n))
                                .cos();
                    }
                }
                assert_relative_eq!(block[k * BLOCK_SIZE + l], sk * sl * direct, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let hasher = PatchHasher::default();
        let patch = textured_patch(PATCH_SIZE);
        assert_eq!(hasher.fingerprint(&patch), hasher.fingerprint(&patch));
    }

    #[test]
    fn test_brightness_shift_invariance() {
        let hasher = PatchHasher::default();
        let base = gradient_patch(false);
        let brighter = GrayImage::from_fn(PATCH_SIZE as u32, PATCH_SIZE as u32, |x, y| {
            Luma([base.get_pixel(x, y).0[0] + 50])
        });
        assert_eq!(hasher.fingerprint(&base), hasher.fingerprint(&brighter));
    }

    #[test]
    fn test_orthogonal_gradients_differ() {
        let hasher = PatchHasher::default();
        let horizontal = hasher.fingerprint(&gradient_patch(true));
        let vertical = hasher.fingerprint(&gradient_patch(false));
        assert!(horizontal.hamming_distance(&vertical) >= 4);
    }

    #[test]
    fn test_reduced_block_leaves_unused_rows_clear() {
        let config = HasherConfig::default().with_hash_size(4).with_patch_size(16);
        assert!(config.validate().is_ok());
        let hasher = PatchHasher::new(config);
        let fingerprint = hasher.fingerprint(&textured_patch(16));

        // Rows 4..8 of the bit grid are the low four bytes of the hex
        // rendering and must stay clear.
        let hex = fingerprint.to_string();
        assert_eq!(&hex[8..], "00000000");
        assert_ne!(&hex[..8], "00000000");
    }
}
