//! Triangle generation over keypoint sets.
//!
//! Every keypoint in turn acts as a triangle *center*. Its partners come
//! from an annulus query: candidates closer than the lower radius carry no
//! geometric information (they collapse under warping), candidates beyond
//! the upper radius pair distant features that rarely co-occur in a crop.
//! A k-d tree keeps the two radius queries cheap.
//!
//! Each emitted triangle is ordered `[center, neighbor, third]`, and every
//! unordered vertex triple is emitted exactly once: pairs are only expanded
//! from their lowest-indexed vertex, and neighbors already paired at the
//! current center are barred from returning as thirds.

use kiddo::{KdTree, SquaredEuclidean};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::{Point2D, Triangle};
use crate::error::{Error, Result};

/// Configuration for annulus-constrained triangle generation
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangleConfig {
    /// Exclusive lower bound on pairwise vertex distance (default 50.0)
    pub lower_radius: f64,
    /// Inclusive upper bound on pairwise vertex distance (default 400.0)
    pub upper_radius: f64,
    /// Exclusive lower bound on triangle area (default 1300.0)
    pub min_area: f64,
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            lower_radius: 50.0,
            upper_radius: 400.0,
            min_area: 1300.0,
        }
    }
}

impl TriangleConfig {
    /// Set both annulus radii
    pub fn with_radius_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_radius = lower;
        self.upper_radius = upper;
        self
    }

    /// Set the area floor
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    /// Validate parameters, rejecting caller misuse eagerly
    pub fn validate(&self) -> Result<()> {
        if !(self.lower_radius.is_finite() && self.lower_radius >= 0.0) {
            return Err(Error::Config(format!(
                "lower_radius must be non-negative, got {}",
                self.lower_radius
            )));
        }
        if !(self.upper_radius.is_finite() && self.upper_radius > self.lower_radius) {
            return Err(Error::Config(format!(
                "upper_radius must exceed lower_radius, got {} <= {}",
                self.upper_radius, self.lower_radius
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

/// All triangles whose vertices are pairwise inside the distance annulus
/// and whose area clears the floor.
///
/// Output order is deterministic: centers ascend, then neighbors, then
/// thirds, all by keypoint index. Fewer than three keypoints yield an
/// empty list.
pub fn generate_triangles(keypoints: &[Point2D], config: &TriangleConfig) -> Vec<Triangle> {
    if keypoints.len() < 3 {
        return Vec::new();
    }

    let in_range = annulus_neighbors(keypoints, config);
    let mut triangles = Vec::new();

    for (i, &center) in keypoints.iter().enumerate() {
        // Indices below the center already expanded every pair they
        // belong to; only higher indices remain as partners.
        let partners = &in_range[i][in_range[i].partition_point(|&j| j <= i)..];
        let mut used_neighbors: HashSet<usize> = HashSet::new();

        for &j in partners {
            for &k in &in_range[j] {
                if partners.binary_search(&k).is_err() || used_neighbors.contains(&k) {
                    continue;
                }
                let triangle = Triangle::new(center, keypoints[j], keypoints[k]);
                if triangle.area() > config.min_area {
                    triangles.push(triangle);
                }
            }
            used_neighbors.insert(j);
        }
    }

    triangles
}

/// Per-keypoint sorted index lists of the other keypoints inside the
/// `(lower_radius, upper_radius]` annulus. Self-distance is zero and never
/// clears the exclusive lower bound.
fn annulus_neighbors(keypoints: &[Point2D], config: &TriangleConfig) -> Vec<Vec<usize>> {
    let lower_sq = config.lower_radius * config.lower_radius;
    let upper_sq = config.upper_radius * config.upper_radius;

    let mut tree: KdTree<f64, 2> = KdTree::new();
    for (i, p) in keypoints.iter().enumerate() {
        tree.add(&[p.x, p.y], i as u64);
    }

    keypoints
        .iter()
        .map(|p| {
            let mut neighbors: Vec<usize> = tree
                .within_unsorted::<SquaredEuclidean>(&[p.x, p.y], upper_sq)
                .into_iter()
                .filter(|n| n.distance > lower_sq)
                .map(|n| n.item as usize)
                .collect();
            neighbors.sort_unstable();
            neighbors
        })
        .collect()
}
