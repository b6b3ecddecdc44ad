//! Keypoint extraction: image preprocessing, contour tracing, and
//! curvature-maxima detection along contour arc length.

pub mod contours;
pub mod keypoints;
pub mod recolor;
pub mod spline;

pub use contours::{binarize, extract_contours, ContourConfig};
pub use keypoints::{
    curvature_profile, extract_keypoints, keypoints_from_contours, local_maxima, KeypointConfig,
};
pub use spline::CubicSpline;
