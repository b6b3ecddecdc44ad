//! End-to-end fingerprint pipeline: image to keypoints, triangles and
//! fingerprints.
//!
//! The pipeline is deliberately infallible per image once constructed:
//! degenerate stages (blank binarization, too-short contours, collinear
//! triangles) produce empty outputs that flow through to an empty
//! fingerprint list. Configuration errors are caught once, eagerly, at
//! construction.

use std::fs;
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::core::{Fingerprint, Point2D, Triangle};
use crate::error::{Error, Result};
use crate::extraction::{extract_contours, keypoints_from_contours, ContourConfig, KeypointConfig};
use crate::hashing::{HasherConfig, TriangleHasher};
use crate::index::IndexConfig;
use crate::triangles::{generate_triangles, TriangleConfig};

/// Aggregated configuration for every pipeline stage
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Contour source parameters
    pub contours: ContourConfig,
    /// Keypoint extraction parameters
    pub keypoints: KeypointConfig,
    /// Triangle generation parameters
    pub triangles: TriangleConfig,
    /// Hash geometry parameters
    pub hasher: HasherConfig,
    /// Index batching parameters
    pub index: IndexConfig,
}

impl PipelineConfig {
    /// Parse a TOML configuration document. Missing sections and fields
    /// fall back to their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate every stage's parameters.
    pub fn validate(&self) -> Result<()> {
        self.contours.validate()?;
        self.keypoints.validate()?;
        self.triangles.validate()?;
        self.hasher.validate()?;
        self.index.validate()?;
        Ok(())
    }
}

/// Everything the pipeline derives from one image
#[derive(Debug, Clone)]
pub struct ImageSignature {
    /// Pooled contour centroids and curvature maxima
    pub keypoints: Vec<Point2D>,
    /// Annulus-constrained triangles over the keypoints
    pub triangles: Vec<Triangle>,
    /// Canonical fingerprints, up to three per triangle
    pub fingerprints: Vec<Fingerprint>,
}

/// Image fingerprinting pipeline.
///
/// Construction validates the configuration; after that, fingerprinting
/// never fails, it only degrades to empty outputs.
#[derive(Debug, Clone)]
pub struct FingerprintPipeline {
    config: PipelineConfig,
    hasher: TriangleHasher,
}

impl FingerprintPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let hasher = TriangleHasher::new(config.hasher)?;
        Ok(Self { config, hasher })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pooled keypoints of an image: per-contour centroids followed by
    /// curvature maxima.
    pub fn keypoints(&self, image: &RgbImage) -> Vec<Point2D> {
        let contours = extract_contours(image, &self.config.contours);
        log::debug!("traced {} contours", contours.len());

        let keypoints = keypoints_from_contours(&contours, &self.config.keypoints);
        log::debug!("pooled {} keypoints", keypoints.len());
        keypoints
    }

    /// Full signature of an image: keypoints, triangles and fingerprints.
    pub fn fingerprint(&self, image: &RgbImage) -> ImageSignature {
        let keypoints = self.keypoints(image);
        let triangles = generate_triangles(&keypoints, &self.config.triangles);
        log::debug!("generated {} triangles", triangles.len());

        let fingerprints = self.hasher.fingerprint_all(image, &triangles);
        log::debug!("hashed {} fingerprints", fingerprints.len());
        if fingerprints.len() < 3 * triangles.len() {
            log::warn!(
                "skipped {} degenerate triangle rotations",
                3 * triangles.len() - fingerprints.len()
            );
        }

        ImageSignature {
            keypoints,
            triangles,
            fingerprints,
        }
    }

    /// Load an image file and fingerprint it.
    pub fn fingerprint_file(&self, path: &Path) -> Result<ImageSignature> {
        log::debug!("fingerprinting {}", path.display());
        let image = image::open(path)?.to_rgb8();
        Ok(self.fingerprint(&image))
    }
}
