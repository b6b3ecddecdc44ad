//! Closed boundary contours extracted from binarized images.

use serde::{Deserialize, Serialize};

use crate::core::point::Point2D;

/// An ordered sequence of boundary points forming a closed polygon.
///
/// Produced once per detected region by the contour source and consumed by
/// the keypoint extractor; the final point is implicitly connected back to
/// the first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point2D>,
}

impl Contour {
    /// Create a contour from an ordered point sequence
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Number of boundary points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the contour has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Boundary points in traversal order
    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Signed polygon area via the shoelace formula.
    ///
    /// Positive for counter-clockwise traversal in a y-up frame; in image
    /// coordinates the sign depends on trace direction, so callers that only
    /// care about size should use [`area`](Self::area).
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for (i, p) in self.points.iter().enumerate() {
            let q = &self.points[(i + 1) % self.points.len()];
            sum += p.cross(q);
        }
        sum / 2.0
    }

    /// Absolute enclosed area
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Polygon centroid from the first-order moments.
    ///
    /// Returns `None` when the enclosed area is numerically zero (collinear
    /// or too-short contours), which callers treat as a degenerate region to
    /// skip rather than an error.
    pub fn centroid(&self) -> Option<Point2D> {
        let area = self.signed_area();
        if area.abs() < 1e-9 {
            return None;
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for (i, p) in self.points.iter().enumerate() {
            let q = &self.points[(i + 1) % self.points.len()];
            let w = p.cross(q);
            cx += (p.x + q.x) * w;
            cy += (p.y + q.y) * w;
        }
        let scale = 1.0 / (6.0 * area);
        Some(Point2D::new(cx * scale, cy * scale))
    }
}

impl From<Vec<Point2D>> for Contour {
    fn from(points: Vec<Point2D>) -> Self {
        Contour::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Contour {
        Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_square_area() {
        let c = unit_square();
        assert!((c.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_centroid() {
        let c = unit_square();
        let centroid = c.centroid().unwrap();
        assert!((centroid.x - 0.5).abs() < 1e-12);
        assert!((centroid.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_area_and_centroid() {
        let c = Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(6.0, 0.0),
            Point2D::new(0.0, 6.0),
        ]);
        assert!((c.area() - 18.0).abs() < 1e-12);
        let centroid = c.centroid().unwrap();
        assert!((centroid.x - 2.0).abs() < 1e-12);
        assert!((centroid.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_centroid_is_none() {
        let collinear = Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 2.0),
        ]);
        assert!(collinear.centroid().is_none());
        assert!(collinear.area() < 1e-12);

        let short = Contour::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        assert!(short.centroid().is_none());
    }
}
