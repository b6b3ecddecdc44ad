//! Contour source: binarize the analyzed channel and trace closed boundaries.
//!
//! # Pipeline
//!
//! ```text
//! RGB image → Gaussian blur → BT.601 luma → band remap → threshold → trace
//! ```
//!
//! The blur runs before grayscale conversion so band membership is decided
//! on smoothed intensities; without it, sensor noise straddling a band edge
//! shreds region boundaries into confetti. Contours below the minimum
//! enclosed area are dropped as noise.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::find_contours;
use imageproc::contrast::threshold;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

use crate::core::{Contour, Point2D};
use crate::error::{Error, Result};
use crate::extraction::recolor::{band_channel, luma_bt601};

/// Configuration for contour extraction
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Gaussian blur sigma applied before band remapping (default 3.5)
    pub blur_sigma: f32,
    /// Binary threshold on the remapped channel (default 127)
    pub threshold: u8,
    /// Minimum enclosed contour area in px^2, exclusive (default 400)
    pub min_area: f64,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 3.5,
            threshold: 127,
            min_area: 400.0,
        }
    }
}

impl ContourConfig {
    /// Set the blur sigma
    pub fn with_blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// Set the minimum enclosed area
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    /// Validate parameters, rejecting caller misuse eagerly
    pub fn validate(&self) -> Result<()> {
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(Error::Config(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if !(self.min_area.is_finite() && self.min_area >= 0.0) {
            return Err(Error::Config(format!(
                "min_area must be non-negative, got {}",
                self.min_area
            )));
        }
        Ok(())
    }
}

/// Binarize the analyzed channel of an RGB image.
///
/// Blur, convert to BT.601 luma (the 0.299/0.587/0.114 weighting, not the
/// built-in BT.709 conversion), remap through the band table and
/// threshold.
pub fn binarize(img: &RgbImage, config: &ContourConfig) -> GrayImage {
    let blurred = gaussian_blur_f32(img, config.blur_sigma);

    let mut remapped = GrayImage::new(blurred.width(), blurred.height());
    for (x, y, px) in blurred.enumerate_pixels() {
        let [r, g, b] = px.0;
        remapped.put_pixel(x, y, Luma([band_channel(luma_bt601(r, g, b))]));
    }

    threshold(&remapped, config.threshold)
}

/// Extract closed contours whose enclosed area exceeds the configured
/// minimum.
///
/// Both outer borders and hole borders are traced, matching the full
/// hierarchy retrieval the area filter expects to see.
pub fn extract_contours(img: &RgbImage, config: &ContourConfig) -> Vec<Contour> {
    let binary = binarize(img, config);

    find_contours::<u32>(&binary)
        .into_iter()
        .map(|c| {
            Contour::new(
                c.points
                    .iter()
                    .map(|p| Point2D::new(p.x as f64, p.y as f64))
                    .collect(),
            )
        })
        .filter(|c| c.area() > config.min_area)
        .collect()
}
