//! Trikona - Transformation-resilient image fingerprinting and lookup
//!
//! Images are reduced to sets of 64-bit fingerprints that survive
//! translation, rotation, reflection, scaling and shear of the depicted
//! content. Matching two images is then set intersection: the more
//! fingerprints they share, the more likely one is a transformed copy of
//! the other.
//!
//! # Architecture
//!
//! The crate is organized into 6 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     main.rs                         │  ← CLI
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   pipeline.rs                       │  ← Orchestration
//! │        (stage wiring, aggregated config)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     index/                          │  ← Retrieval
//! │      (store seam, vote ranking, snapshots)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    hashing/                         │  ← Fingerprints
//! │        (affine canonicalization, DCT hash)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │          extraction/        triangles/              │  ← Geometry
//! │   (contours, curvature)  (annulus queries)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      core/                          │  ← Foundation
//! │        (points, contours, fingerprints)             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipeline
//!
//! 1. **Contours**: blur, band-remap and threshold the image, then trace
//!    region boundaries.
//! 2. **Keypoints**: contour centroids plus curvature maxima along
//!    arc-length-parameterized contour splines.
//! 3. **Triangles**: every keypoint triple whose pairwise distances fall
//!    in an annulus and whose area clears a floor.
//! 4. **Fingerprints**: each triangle is affine-warped onto a reference
//!    frame three ways (one per base vertex) and each canonical patch is
//!    reduced to a 64-bit DCT hash.
//! 5. **Index**: an inverted fingerprint index ranks candidate images by
//!    shared fingerprint count.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Error handling (depends on core)
// ============================================================================
pub mod error;

// ============================================================================
// Layer 3: Geometry extraction (depends on core)
// ============================================================================
pub mod extraction;
pub mod triangles;

// ============================================================================
// Layer 4: Fingerprint hashing (depends on core, extraction)
// ============================================================================
pub mod hashing;

// ============================================================================
// Layer 5: Retrieval index (depends on core)
// ============================================================================
pub mod index;

// ============================================================================
// Layer 6: Pipeline orchestration (depends on all layers)
// ============================================================================
pub mod pipeline;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::{Contour, Fingerprint, ImageId, Point2D, Triangle};

// Errors
pub use error::{Error, Result};

// Extraction
pub use extraction::{
    extract_contours, extract_keypoints, keypoints_from_contours, ContourConfig, KeypointConfig,
};

// Triangles
pub use triangles::{generate_triangles, TriangleConfig};

// Hashing
pub use hashing::{fingerprint_triangle, HasherConfig, PatchHasher, TriangleHasher};

// Index
pub use index::{
    load_snapshot, save_snapshot, FingerprintStore, IndexConfig, Match, MemoryStore,
    SimilarityIndex,
};

// Pipeline
pub use pipeline::{FingerprintPipeline, ImageSignature, PipelineConfig};
