//! Affine canonicalization: warp triangle content onto a reference frame
//! and fingerprint it.
//!
//! # Algorithm
//!
//! 1. Cycle the triangle through its three vertex rotations so each vertex
//!    serves once as the base.
//! 2. Normalize winding: express the other two vertices relative to the
//!    base and swap them when their cross product is positive, so a shape
//!    and its mirror image canonicalize identically.
//! 3. Solve for the affine map sending the base to the origin and the two
//!    edge vectors onto the reference triangle, then warp the image into a
//!    fixed-size patch under that map.
//! 4. Shrink the patch to 32x32, convert to luma and fingerprint it.
//!
//! A triangle therefore contributes up to three fingerprints, one per
//! rotation; rotations whose affine solve degenerates are skipped.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use rayon::prelude::*;

use crate::core::{Fingerprint, Point2D, Triangle};
use crate::error::Result;
use crate::extraction::recolor::luma_bt601;
use crate::hashing::dct::PatchHasher;
use crate::hashing::HasherConfig;

/// Height of the rendered canonical patch in pixels
pub const PATCH_HEIGHT: u32 = 60;

/// Width of the rendered canonical patch, covering the reference triangle
pub const PATCH_WIDTH: u32 = 52;

/// Width of the reference triangle (0.86 of its height)
const TARGET_WIDTH: f64 = PATCH_HEIGHT as f64 * 0.86;

/// Forward affine map sending a winding-normalized triangle onto the
/// reference triangle, or `None` when the vertices are collinear.
///
/// The base vertex lands on the origin; the remaining two land on the
/// bottom-middle and top-right reference corners.
fn canonical_projection(vertices: &[Point2D; 3]) -> Option<Projection> {
    let base = vertices[0];
    let mut e1 = vertices[1] - base;
    let mut e2 = vertices[2] - base;
    if e1.cross(&e2) > 0.0 {
        std::mem::swap(&mut e1, &mut e2);
    }

    let det = e1.cross(&e2);
    if !det.is_finite() || det == 0.0 {
        return None;
    }

    // Target corners for the two edge vectors.
    let t1 = Point2D::new(TARGET_WIDTH / 2.0, PATCH_HEIGHT as f64);
    let t2 = Point2D::new(TARGET_WIDTH, 0.0);

    // Linear part: target edge matrix times the inverse input edge matrix.
    let a00 = (t1.x * e2.y - t2.x * e1.y) / det;
    let a01 = (t2.x * e1.x - t1.x * e2.x) / det;
    let a10 = (t1.y * e2.y - t2.y * e1.y) / det;
    let a11 = (t2.y * e1.x - t1.y * e2.x) / det;

    // Translation folds the base-to-origin shift through the linear part.
    let b0 = -(a00 * base.x + a01 * base.y);
    let b1 = -(a10 * base.x + a11 * base.y);

    Projection::from_matrix([
        a00 as f32, a01 as f32, b0 as f32,
        a10 as f32, a11 as f32, b1 as f32,
        0.0, 0.0, 1.0,
    ])
}

/// Warp the image under the projection, shrink to the analysis patch size
/// and convert to luma.
fn render_patch(image: &RgbImage, projection: &Projection, patch_size: u32) -> GrayImage {
    let mut patch = RgbImage::new(PATCH_WIDTH, PATCH_HEIGHT);
    warp_into(
        image,
        projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut patch,
    );

    let resized = imageops::resize(&patch, patch_size, patch_size, FilterType::Triangle);

    let mut gray = GrayImage::new(patch_size, patch_size);
    for (x, y, px) in resized.enumerate_pixels() {
        let [r, g, b] = px.0;
        gray.put_pixel(x, y, Luma([luma_bt601(r, g, b)]));
    }
    gray
}

/// Fingerprints of one triangle, one per vertex rotation whose affine
/// solve succeeds, in rotation order.
pub fn fingerprint_triangle(
    image: &RgbImage,
    triangle: &Triangle,
    hasher: &PatchHasher,
) -> Vec<Fingerprint> {
    let patch_size = hasher.patch_size() as u32;
    triangle
        .rotations()
        .iter()
        .filter_map(|rotation| canonical_projection(rotation))
        .map(|projection| hasher.fingerprint(&render_patch(image, &projection, patch_size)))
        .collect()
}

/// Parallel fingerprint engine over triangle batches.
///
/// Triangles are split into one contiguous batch per available worker and
/// hashed by pure workers sharing the image read-only; batch results are
/// concatenated in input order, so output order is deterministic
/// regardless of scheduling.
#[derive(Debug, Clone, Default)]
pub struct TriangleHasher {
    patch_hasher: PatchHasher,
}

impl TriangleHasher {
    /// Build the engine for a hash geometry, rejecting an invalid config
    /// before any image is touched.
    pub fn new(config: HasherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            patch_hasher: PatchHasher::new(config),
        })
    }

    /// Fingerprint every triangle against the image.
    ///
    /// The output concatenates each triangle's rotation fingerprints in
    /// triangle order; degenerate rotations contribute nothing.
    pub fn fingerprint_all(&self, image: &RgbImage, triangles: &[Triangle]) -> Vec<Fingerprint> {
        if triangles.is_empty() {
            return Vec::new();
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let batch = (triangles.len() / workers).max(1);

        triangles
            .par_chunks(batch)
            .flat_map_iter(|chunk| {
                chunk
                    .iter()
                    .flat_map(|t| fingerprint_triangle(image, t, &self.patch_hasher))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Deterministic textured scene on a black canvas, shifted by an
    /// integer offset. Texture is confined to a bounded window so shifted
    /// copies agree outside it.
    fn scene(shift_x: i64, shift_y: i64) -> RgbImage {
        RgbImage::from_fn(400, 400, |x, y| {
            let sx = x as i64 - shift_x;
            let sy = y as i64 - shift_y;
            if !(20..220).contains(&sx) || !(20..200).contains(&sy) {
                return Rgb([0, 0, 0]);
            }
            let (sx, sy) = (sx as u32, sy as u32);
            if (sx as i64 - 80).pow(2) + (sy as i64 - 60).pow(2) < 900 {
                Rgb([230, 180, 40])
            } else {
                let base = ((sx * 3 + sy * 5) % 200) as u8;
                Rgb([base, base / 2, 255 - base])
            }
        })
    }

    fn scene_triangle(shift_x: f64, shift_y: f64) -> Triangle {
        Triangle::new(
            Point2D::new(40.0 + shift_x, 30.0 + shift_y),
            Point2D::new(150.0 + shift_x, 40.0 + shift_y),
            Point2D::new(90.0 + shift_x, 140.0 + shift_y),
        )
    }

    fn map(projection: &Projection, p: Point2D) -> (f32, f32) {
        *projection * (p.x as f32, p.y as f32)
    }

    #[test]
    fn test_projection_hits_reference_corners() {
        let vertices = [
            Point2D::new(40.0, 30.0),
            Point2D::new(150.0, 40.0),
            Point2D::new(90.0, 140.0),
        ];
        let projection = canonical_projection(&vertices).unwrap();

        let (bx, by) = map(&projection, vertices[0]);
        assert_relative_eq!(bx, 0.0, epsilon = 1e-3);
        assert_relative_eq!(by, 0.0, epsilon = 1e-3);

        // The other two vertices cover both reference corners, in the
        // order the winding rule picked.
        let mut images = [map(&projection, vertices[1]), map(&projection, vertices[2])];
        images.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        assert_relative_eq!(images[0].0, TARGET_WIDTH as f32 / 2.0, epsilon = 1e-3);
        assert_relative_eq!(images[0].1, PATCH_HEIGHT as f32, epsilon = 1e-3);
        assert_relative_eq!(images[1].0, TARGET_WIDTH as f32, epsilon = 1e-3);
        assert_relative_eq!(images[1].1, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_collinear_triangle_yields_nothing() {
        let degenerate = Triangle::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(50.0, 50.0),
            Point2D::new(100.0, 100.0),
        );
        let image = scene(0, 0);
        let hasher = PatchHasher::default();
        assert!(fingerprint_triangle(&image, &degenerate, &hasher).is_empty());
    }

    #[test]
    fn test_vertex_order_never_changes_fingerprints() {
        // Winding normalization plus the three rotations make the
        // fingerprint multiset a function of the vertex set alone; all six
        // orderings of the same three vertices must agree.
        let image = scene(0, 0);
        let hasher = PatchHasher::default();
        let [a, b, c] = scene_triangle(0.0, 0.0).vertices;

        let orderings = [
            [a, b, c],
            [a, c, b],
            [b, a, c],
            [b, c, a],
            [c, a, b],
            [c, b, a],
        ];
        let mut reference =
            fingerprint_triangle(&image, &Triangle::new(a, b, c), &hasher);
        assert_eq!(reference.len(), 3);
        reference.sort();

        for [p, q, r] in &orderings[1..] {
            let mut fps =
                fingerprint_triangle(&image, &Triangle::new(*p, *q, *r), &hasher);
            fps.sort();
            assert_eq!(fps, reference, "ordering {:?} disagrees", [p, q, r]);
        }
    }

    #[test]
    fn test_translation_stability() {
        let hasher = PatchHasher::default();
        let original = fingerprint_triangle(&scene(0, 0), &scene_triangle(0.0, 0.0), &hasher);
        let shifted = fingerprint_triangle(&scene(17, 9), &scene_triangle(17.0, 9.0), &hasher);

        assert_eq!(original.len(), 3);
        assert_eq!(shifted.len(), 3);
        // Identical content under an integer shift: allow only for float
        // jitter at the bit threshold.
        for (a, b) in original.iter().zip(&shifted) {
            assert!(a.hamming_distance(b) <= 4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_batch_matches_serial_order() {
        let image = scene(0, 0);
        let triangles: Vec<Triangle> = (0..8)
            .map(|i| scene_triangle(i as f64 * 3.0, i as f64 * 2.0))
            .collect();

        let engine = TriangleHasher::default();
        let batched = engine.fingerprint_all(&image, &triangles);

        let serial: Vec<Fingerprint> = triangles
            .iter()
            .flat_map(|t| fingerprint_triangle(&image, t, &engine.patch_hasher))
            .collect();

        assert_eq!(batched.len(), 24);
        assert_eq!(batched, serial);
    }

    #[test]
    fn test_empty_batch() {
        let engine = TriangleHasher::default();
        assert!(engine.fingerprint_all(&scene(0, 0), &[]).is_empty());
    }
}
