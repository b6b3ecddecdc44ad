//! 64-bit perceptual fingerprints and their hex encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A 64-bit perceptual fingerprint of one canonical triangle patch.
///
/// Externally represented as a 16-character lowercase hex string. The bit
/// layout is part of the compatibility surface: byte `r` of the big-endian
/// value holds row `r` of the 8x8 coefficient block, and bit `c` of that
/// byte (LSB first) holds column `c`. Renderings therefore start with row 0
/// and any index built with one encoder can be queried by another.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of hex characters in the external encoding
    pub const HEX_LEN: usize = 16;

    /// Wrap a raw 64-bit value
    #[inline]
    pub fn from_value(value: u64) -> Self {
        Fingerprint(value)
    }

    /// Pack an 8x8 bit block, row-major
    pub fn from_bits(bits: &[[bool; 8]; 8]) -> Self {
        let mut value = 0u64;
        for (row, row_bits) in bits.iter().enumerate() {
            let mut byte = 0u8;
            for (col, &bit) in row_bits.iter().enumerate() {
                if bit {
                    byte |= 1 << col;
                }
            }
            value |= (byte as u64) << (8 * (7 - row));
        }
        Fingerprint(value)
    }

    /// Raw 64-bit value
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Number of differing bits between two fingerprints
    #[inline]
    pub fn hamming_distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl From<u64> for Fingerprint {
    #[inline]
    fn from(value: u64) -> Self {
        Fingerprint(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(Error::Fingerprint(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }
        let value = u64::from_str_radix(s, 16)
            .map_err(|e| Error::Fingerprint(format!("{:?}: {}", s, e)))?;
        Ok(Fingerprint(value))
    }
}
