//! 2D point type used throughout the pipeline.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A point in image coordinates (pixels, f64)
///
/// Doubles as a 2D vector for the geometric predicates the pipeline needs
/// (edge vectors, cross products, annulus distances).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate (column, grows rightward)
    pub x: f64,
    /// Y coordinate (row, grows downward)
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (faster, avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Length (magnitude) of this point as a vector from origin
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Dot product with another point (as vectors)
    #[inline]
    pub fn dot(&self, other: &Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Cross product (z-component of the 3D cross product)
    ///
    /// Positive when `other` is clockwise of `self` in image coordinates
    /// (y grows downward).
    #[inline]
    pub fn cross(&self, other: &Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point2D::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point2D::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Point2D::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f64) -> Self {
        Point2D::new(self.x / scalar, self.y / scalar)
    }
}

impl From<(f64, f64)> for Point2D {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_sign() {
        let e1 = Point2D::new(1.0, 0.0);
        let e2 = Point2D::new(0.0, 1.0);
        // In image coordinates (y down), +x cross +y is positive.
        assert!(e1.cross(&e2) > 0.0);
        assert!(e2.cross(&e1) < 0.0);
    }

    #[test]
    fn test_vector_ops() {
        let a = Point2D::new(2.0, 3.0);
        let b = Point2D::new(1.0, -1.0);
        assert_eq!(a + b, Point2D::new(3.0, 2.0));
        assert_eq!(a - b, Point2D::new(1.0, 4.0));
        assert_eq!(a * 2.0, Point2D::new(4.0, 6.0));
        assert_eq!(a / 2.0, Point2D::new(1.0, 1.5));
        assert!((a.dot(&b) - (-1.0)).abs() < 1e-12);
    }
}
