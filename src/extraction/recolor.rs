//! Gray-value remapping used to isolate the analyzed contour channel.
//!
//! Incoming luma is pushed through a fixed pseudo-random remap table that is
//! collapsed into constant runs ("bands") of 40 gray levels. Each band's
//! remapped value is then routed to one of three virtual channels by its
//! residue mod 3, and only one channel is analyzed for contours. The
//! combined effect of banding, channel isolation and the downstream binary
//! threshold is that a narrow range of mid-bright luma becomes foreground
//! and everything else becomes background.
//!
//! The table is a process-wide immutable constant built at compile time;
//! nothing mutates it at runtime.

/// Width of one constant run in the remap table
pub const BAND_WIDTH: usize = 40;

/// Seed permutation of the 256 gray levels, prior to banding
const SHUFFLE: [u8; 256] = [
    16, 124, 115, 68, 98, 176, 225, 55, 50, 53, 129, 19, 57, 160, 143, 237,
    75, 164, 206, 167, 103, 140, 90, 112, 244, 240, 107, 202, 185, 72, 71,
    109, 74, 183, 205, 46, 121, 180, 142, 126, 38, 247, 166, 144, 67, 134,
    194, 198, 23, 186, 33, 163, 24, 117, 37, 76, 147, 47, 52, 42, 70, 108,
    30, 54, 89, 59, 73, 91, 151, 6, 173, 86, 182, 178, 10, 207, 171, 13, 77,
    88, 159, 125, 11, 188, 238, 41, 92, 118, 201, 132, 48, 28, 195, 17, 119,
    64, 25, 45, 114, 80, 187, 105, 204, 158, 20, 169, 83, 191, 199, 234, 136,
    81, 252, 141, 242, 219, 138, 161, 154, 135, 63, 153, 239, 130, 223, 249,
    122, 93, 216, 127, 111, 15, 12, 8, 44, 193, 245, 0, 235, 120, 31, 165, 3,
    155, 43, 26, 152, 94, 29, 232, 35, 218, 230, 233, 214, 217, 7, 156, 189,
    228, 137, 209, 145, 226, 97, 215, 170, 51, 224, 100, 61, 69, 250, 4, 34,
    56, 255, 60, 84, 110, 203, 222, 133, 248, 106, 212, 87, 253, 208, 101, 116,
    251, 190, 99, 32, 113, 157, 27, 79, 82, 146, 149, 5, 210, 65, 22, 181, 131,
    62, 36, 184, 196, 231, 192, 66, 213, 2, 254, 174, 211, 236, 229, 58, 221,
    21, 150, 123, 175, 177, 179, 246, 96, 227, 1, 18, 241, 49, 128, 78, 40,
    14, 162, 85, 39, 172, 104, 9, 200, 220, 139, 168, 95, 243, 197, 148, 102,
];

/// Collapse the seed table into constant runs of [`BAND_WIDTH`].
///
/// Runs start at multiples of the band width and take the seed value at
/// their first index; the partial tail run takes the seed value at its own
/// first index.
const fn band(table: [u8; 256]) -> [u8; 256] {
    let mut t = table;
    let full = BAND_WIDTH * (256 / BAND_WIDTH);

    let mut start = 0;
    while start < full {
        let v = t[start];
        let mut i = start;
        while i < start + BAND_WIDTH {
            t[i] = v;
            i += 1;
        }
        start += BAND_WIDTH;
    }

    let tail = t[full];
    let mut i = full;
    while i < 256 {
        t[i] = tail;
        i += 1;
    }

    t
}

/// Banded remap table indexed by gray level
pub const BAND_REMAP: [u8; 256] = band(SHUFFLE);

/// Remapped value of `gray` on the analyzed channel.
///
/// Values whose residue mod 3 routes them to the analyzed channel keep
/// their remapped value; everything else maps to 0 (background).
#[inline]
pub fn band_channel(gray: u8) -> u8 {
    let v = BAND_REMAP[gray as usize];
    if v % 3 == 2 { v } else { 0 }
}

/// BT.601 luma of an RGB pixel, rounded to the nearest gray level.
///
/// The 0.299/0.587/0.114 weighting, not the BT.709 one the `image` crate
/// builds in; the remap table and the patch hasher both assume it.
#[inline]
pub fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    luma.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_are_constant_runs() {
        for start in (0..240).step_by(BAND_WIDTH) {
            let v = BAND_REMAP[start];
            for i in start..start + BAND_WIDTH {
                assert_eq!(BAND_REMAP[i], v, "band starting at {} not constant", start);
            }
            assert_eq!(v, SHUFFLE[start]);
        }
        // Tail run [240, 256) is constant at the seed's value for 240.
        for i in 240..256 {
            assert_eq!(BAND_REMAP[i], SHUFFLE[240]);
        }
    }

    #[test]
    fn test_channel_isolation() {
        for gray in 0..=255u8 {
            let v = band_channel(gray);
            assert!(v == 0 || v % 3 == 2);
            assert_eq!(v != 0, BAND_REMAP[gray as usize] % 3 == 2);
        }
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma_bt601(255, 255, 255), 255);
        assert_eq!(luma_bt601(0, 0, 0), 0);
        // Pure channels round to their weight share of full scale.
        assert_eq!(luma_bt601(255, 0, 0), 76);
        assert_eq!(luma_bt601(0, 255, 0), 150);
        assert_eq!(luma_bt601(0, 0, 255), 29);
    }

    #[test]
    fn test_foreground_band() {
        // Only the two mid-bright bands survive both channel isolation and
        // the downstream binary threshold at 127.
        for gray in 0..=255u16 {
            let v = band_channel(gray as u8);
            let foreground = v > 127;
            assert_eq!(
                foreground,
                (160..240).contains(&gray),
                "gray level {} unexpected foreground status",
                gray
            );
        }
    }
}
