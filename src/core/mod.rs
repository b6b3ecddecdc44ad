//! Core value types: points, contours, triangles, fingerprints.
//!
//! This layer has no internal dependencies; everything above it builds on
//! these types.

pub mod contour;
pub mod fingerprint;
pub mod point;
pub mod triangle;

pub use contour::Contour;
pub use fingerprint::Fingerprint;
pub use point::Point2D;
pub use triangle::{Triangle, VERTEX_ROTATIONS};

/// Externally supplied stable image key (a path or content hash).
///
/// Owned by the surrounding application; the pipeline only references it.
pub type ImageId = String;
