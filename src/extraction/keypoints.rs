//! Curvature-maxima keypoints along contour arc length.
//!
//! # Algorithm
//!
//! 1. Fit smoothing splines x(t), y(t) over the sample index t = 0..n-1.
//! 2. Integrate speed sqrt(x'^2 + y'^2) by the trapezoid rule to get the
//!    arc length at every sample.
//! 3. Re-fit x(s), y(s) against arc length. Parameterizing by distance
//!    traveled instead of sample index makes curvature a property of the
//!    shape, not of how densely the tracer happened to emit points.
//! 4. Curvature k = |x'y'' - y'x''| / (x'^2 + y'^2)^(3/2) at every sample's
//!    arc-length position.
//! 5. A sample is a keypoint when its curvature strictly exceeds that of
//!    its `order` neighbors on both sides (window comparisons clip at the
//!    boundary, so the first and last samples never qualify).
//!
//! Degenerate contours (too few points, stalled arc length from coincident
//! samples) yield an empty keypoint list, never an error.

use serde::{Deserialize, Serialize};

use crate::core::{Contour, Point2D};
use crate::error::{Error, Result};
use crate::extraction::spline::CubicSpline;

/// Configuration for curvature keypoint extraction
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypointConfig {
    /// Spline smoothing weight; 0.0 interpolates exactly (default 0.0)
    pub smoothing: f64,
    /// Neighbors compared on each side of a curvature maximum (default 2)
    pub maxima_order: usize,
    /// Unit normalization divisor applied to both coordinates (default 1.0)
    pub pixels_per_unit: f64,
}

impl Default for KeypointConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.0,
            maxima_order: 2,
            pixels_per_unit: 1.0,
        }
    }
}

impl KeypointConfig {
    /// Set the spline smoothing weight
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the maxima comparison window
    pub fn with_maxima_order(mut self, order: usize) -> Self {
        self.maxima_order = order;
        self
    }

    /// Validate parameters, rejecting caller misuse eagerly
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing.is_finite() && self.smoothing >= 0.0) {
            return Err(Error::Config(format!(
                "smoothing must be non-negative, got {}",
                self.smoothing
            )));
        }
        if self.maxima_order == 0 {
            return Err(Error::Config("maxima_order must be at least 1".into()));
        }
        if !(self.pixels_per_unit.is_finite() && self.pixels_per_unit > 0.0) {
            return Err(Error::Config(format!(
                "pixels_per_unit must be positive, got {}",
                self.pixels_per_unit
            )));
        }
        Ok(())
    }
}

/// Keypoints of one contour: samples of locally maximal curvature, in
/// arc-length order, in normalized coordinates.
pub fn extract_keypoints(contour: &Contour, config: &KeypointConfig) -> Vec<Point2D> {
    let Some((xs, ys, curvature)) = arc_length_curvature(contour, config) else {
        return Vec::new();
    };

    local_maxima(&curvature, config.maxima_order)
        .into_iter()
        .map(|i| Point2D::new(xs[i], ys[i]))
        .collect()
}

/// Curvature at every contour sample, after arc-length reparameterization.
///
/// Empty when the contour is degenerate. Values are always non-negative.
pub fn curvature_profile(contour: &Contour, config: &KeypointConfig) -> Vec<f64> {
    match arc_length_curvature(contour, config) {
        Some((_, _, curvature)) => curvature,
        None => Vec::new(),
    }
}

/// Pool the keypoints of one image: every surviving contour contributes its
/// integer-truncated centroid, then its curvature maxima.
///
/// Centroid-degenerate contours (zero-area moment) contribute no centroid;
/// curvature-degenerate contours contribute no maxima. Both are skipped
/// silently, and duplicates across contours are deliberately kept.
pub fn keypoints_from_contours(contours: &[Contour], config: &KeypointConfig) -> Vec<Point2D> {
    let scale = 1.0 / config.pixels_per_unit;
    let mut keypoints = Vec::new();

    for contour in contours {
        if let Some(c) = contour.centroid() {
            keypoints.push(Point2D::new(c.x.trunc() * scale, c.y.trunc() * scale));
        }
    }
    for contour in contours {
        keypoints.extend(extract_keypoints(contour, config));
    }

    keypoints
}

/// Shared spline/arc-length stage: returns normalized coordinates plus the
/// per-sample curvature, or `None` for degenerate contours.
fn arc_length_curvature(
    contour: &Contour,
    config: &KeypointConfig,
) -> Option<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let n = contour.len();
    let scale = 1.0 / config.pixels_per_unit;
    let xs: Vec<f64> = contour.points().iter().map(|p| p.x * scale).collect();
    let ys: Vec<f64> = contour.points().iter().map(|p| p.y * scale).collect();
    let t: Vec<f64> = (0..n).map(|i| i as f64).collect();

    let fx_t = CubicSpline::fit(&t, &xs, config.smoothing)?;
    let fy_t = CubicSpline::fit(&t, &ys, config.smoothing)?;

    // Arc length by trapezoidal integration of the speed along t.
    let speeds: Vec<f64> = t
        .iter()
        .map(|&ti| fx_t.derivative(ti).hypot(fy_t.derivative(ti)))
        .collect();
    let mut arc = Vec::with_capacity(n);
    arc.push(0.0);
    for i in 1..n {
        let ds = (speeds[i] + speeds[i - 1]) * 0.5 * (t[i] - t[i - 1]);
        arc.push(arc[i - 1] + ds);
    }

    // Re-fit against arc length. A stalled arc (coincident samples) fails
    // the strict-monotonicity requirement and marks the contour degenerate.
    let fx_s = CubicSpline::fit(&arc, fx_t.knot_values(), config.smoothing)?;
    let fy_s = CubicSpline::fit(&arc, fy_t.knot_values(), config.smoothing)?;

    let curvature: Vec<f64> = arc
        .iter()
        .map(|&s| {
            let x1 = fx_s.derivative(s);
            let x2 = fx_s.second_derivative(s);
            let y1 = fy_s.derivative(s);
            let y2 = fy_s.second_derivative(s);
            let denom = (x1 * x1 + y1 * y1).powf(1.5);
            if denom > 0.0 {
                (x1 * y2 - y1 * x2).abs() / denom
            } else {
                0.0
            }
        })
        .collect();

    Some((xs, ys, curvature))
}

/// Indices whose value strictly exceeds all neighbors within `order` on
/// both sides. Window indices clip at the array boundary, so index 0 and
/// the last index compare against themselves and never qualify.
pub fn local_maxima(values: &[f64], order: usize) -> Vec<usize> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut maxima = Vec::new();
    'candidates: for i in 0..n {
        for d in 1..=order {
            let left = i.saturating_sub(d);
            let right = (i + d).min(n - 1);
            if !(values[i] > values[left]) || !(values[i] > values[right]) {
                continue 'candidates;
            }
        }
        maxima.push(i);
    }
    maxima
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;

    /// Contour sampling a circle of the given radius, open at the seam
    /// (the tracer does not wrap).
    fn circle_contour(radius: f64, n: usize) -> Contour {
        let points = (0..n)
            .map(|i| {
                let angle = i as f64 / n as f64 * TAU;
                Point2D::new(
                    200.0 + radius * angle.cos(),
                    200.0 + radius * angle.sin(),
                )
            })
            .collect();
        Contour::new(points)
    }

    /// Square boundary walked at `per_side` samples per edge, corners at
    /// multiples of `per_side`.
    fn square_contour(side: f64, per_side: usize) -> Contour {
        let step = side / per_side as f64;
        let mut points = Vec::new();
        for i in 0..per_side {
            points.push(Point2D::new(i as f64 * step, 0.0));
        }
        for i in 0..per_side {
            points.push(Point2D::new(side, i as f64 * step));
        }
        for i in 0..per_side {
            points.push(Point2D::new(side - i as f64 * step, side));
        }
        for i in 0..per_side {
            points.push(Point2D::new(0.0, side - i as f64 * step));
        }
        Contour::new(points)
    }

    #[test]
    fn test_circle_curvature_is_inverse_radius() {
        let radius = 50.0;
        let contour = circle_contour(radius, 120);
        let curvature = curvature_profile(&contour, &KeypointConfig::default());
        assert_eq!(curvature.len(), 120);

        // Interior samples: constant curvature 1/r. The open seam makes the
        // few boundary samples unreliable (natural end conditions).
        for &k in &curvature[5..115] {
            assert!(k >= 0.0);
            assert!((k - 1.0 / radius).abs() < 0.25 / radius, "curvature {}", k);
        }
        // Non-negativity holds everywhere including the seam.
        assert!(curvature.iter().all(|&k| k >= 0.0));
    }

    #[test]
    fn test_square_corners_are_maxima() {
        let per_side = 25;
        let contour = square_contour(100.0, per_side);
        let keypoints = extract_keypoints(&contour, &KeypointConfig::default());
        assert!(!keypoints.is_empty());

        // Every keypoint is one of the original samples.
        for kp in &keypoints {
            assert!(contour.points().iter().any(|p| p == kp));
        }

        // The three interior corners are detected (the seam corner at index
        // 0 is clipped by the window rule). Allow a sample of slack for
        // spline ringing.
        for corner in [1, 2, 3] {
            let corner_point = contour.points()[corner * per_side];
            assert!(
                keypoints
                    .iter()
                    .any(|kp| kp.distance(&corner_point) <= 100.0 / per_side as f64),
                "corner {} missed",
                corner
            );
        }
    }

    #[test]
    fn test_degenerate_contours_yield_no_keypoints() {
        let config = KeypointConfig::default();

        let too_short = Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert!(extract_keypoints(&too_short, &config).is_empty());

        let stalled = Contour::new(vec![Point2D::new(5.0, 5.0); 10]);
        assert!(extract_keypoints(&stalled, &config).is_empty());
        assert!(curvature_profile(&stalled, &config).is_empty());
    }

    #[test]
    fn test_unit_normalization_scales_output() {
        let contour = square_contour(100.0, 25);
        let config = KeypointConfig {
            pixels_per_unit: 10.0,
            ..Default::default()
        };
        let keypoints = extract_keypoints(&contour, &config);
        assert!(!keypoints.is_empty());
        for kp in &keypoints {
            assert!(kp.x <= 10.0 + 1e-9 && kp.y <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn test_local_maxima_window() {
        // Single sharp peak.
        let v = [0.0, 1.0, 5.0, 1.0, 0.0];
        assert_eq!(local_maxima(&v, 2), vec![2]);

        // Plateaus are not strict maxima.
        let v = [0.0, 5.0, 5.0, 0.0, 0.0];
        assert!(local_maxima(&v, 1).is_empty());

        // Boundary samples never qualify.
        let v = [9.0, 1.0, 0.0, 1.0, 9.0];
        assert!(local_maxima(&v, 2).is_empty());

        // Order widens the window: a bump beats order 1 but a taller
        // neighbor two away vetoes it at order 2.
        let v = [0.0, 0.0, 3.0, 2.0, 4.0, 0.0, 0.0];
        assert_eq!(local_maxima(&v, 1), vec![2, 4]);
        assert_eq!(local_maxima(&v, 2), vec![4]);
    }

    #[test]
    fn test_keypoints_from_contours_pools_centroids_first() {
        let contour = square_contour(100.0, 25);
        let config = KeypointConfig::default();
        let pooled = keypoints_from_contours(std::slice::from_ref(&contour), &config);
        let maxima = extract_keypoints(&contour, &config);

        assert_eq!(pooled.len(), maxima.len() + 1);
        // Truncated centroid of the square boundary.
        assert_eq!(pooled[0], Point2D::new(50.0, 50.0));
        assert_eq!(&pooled[1..], &maxima[..]);
    }

    #[test]
    fn test_config_validation() {
        assert!(KeypointConfig::default().validate().is_ok());
        assert!(KeypointConfig::default().with_smoothing(-1.0).validate().is_err());
        assert!(KeypointConfig::default().with_maxima_order(0).validate().is_err());
        let bad_scale = KeypointConfig {
            pixels_per_unit: 0.0,
            ..Default::default()
        };
        assert!(bad_scale.validate().is_err());
    }
}
