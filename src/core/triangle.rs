//! Triangles built from keypoint triples.

use serde::{Deserialize, Serialize};

use crate::core::point::Point2D;

/// An ordered triple of keypoints.
///
/// The order is (center, neighbor, third) as emitted by the triangle
/// generator. Order only matters insofar as it selects which vertex anchors
/// each of the three base-vertex rotations during hashing; the underlying
/// geometric triangle is the unordered point set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertices in generator order
    pub vertices: [Point2D; 3],
}

/// The three cyclic vertex orders used for hashing, one per base vertex.
pub const VERTEX_ROTATIONS: [[usize; 3]; 3] = [[0, 1, 2], [1, 2, 0], [2, 0, 1]];

impl Triangle {
    /// Create a triangle from three vertices
    #[inline]
    pub fn new(a: Point2D, b: Point2D, c: Point2D) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Enclosed area (half the edge cross product magnitude)
    #[inline]
    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).abs() / 2.0
    }

    /// The three cyclic reorderings of the vertices.
    ///
    /// Each rotation anchors a different vertex as the hashing base, giving
    /// three independent fingerprints per triangle.
    #[inline]
    pub fn rotations(&self) -> [[Point2D; 3]; 3] {
        let v = &self.vertices;
        VERTEX_ROTATIONS.map(|[i, j, k]| [v[i], v[j], v[k]])
    }
}
