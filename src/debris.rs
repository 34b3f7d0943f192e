//! Debris figures: decorative triangles and stars drawn into glyph-free
//! cells to disturb character segmentation.

use rand::Rng;

use crate::basics::PI;
use crate::captcha_layout::DecoyKind;
use crate::color::ColorRgba;
use crate::geometry::{polygon_centroid, rotate_polygon, BoundingBox, Point};
use crate::polygon::{paint_polygon, DrawingBackend};

/// Ratio of a star's inner radius to its outer one.
const STAR_INNER_RATIO: f64 = 0.4;

fn regular_star(center: Point, outer: f64, inner: f64, spikes: usize) -> Vec<Point> {
    let n = spikes * 2;
    (0..n)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = -PI / 2.0 + PI * i as f64 / spikes as f64;
            Point::new(center.x + r * a.cos(), center.y + r * a.sin())
        })
        .collect()
}

/// Random radius that keeps a figure inside `cell`.
fn radius<R: Rng + ?Sized>(rng: &mut R, cell: &BoundingBox) -> f64 {
    cell.width().min(cell.height()) / 2.0 * rng.gen_range(0.6..=0.95)
}

/// An irregular triangle inscribed in a circle around the cell center.
pub fn triangle<R: Rng + ?Sized>(rng: &mut R, cell: &BoundingBox) -> Vec<Point> {
    let c = cell.center();
    let r = radius(rng, cell);
    let base = rng.gen_range(0.0..2.0 * PI);
    (0..3)
        .map(|i| {
            let a = base + 2.0 * PI * i as f64 / 3.0 + rng.gen_range(-0.4..=0.4);
            Point::new(c.x + r * a.cos(), c.y + r * a.sin())
        })
        .collect()
}

/// A 4 to 6 pointed star centered in the cell, randomly rotated.
pub fn star<R: Rng + ?Sized>(rng: &mut R, cell: &BoundingBox) -> Vec<Point> {
    let c = cell.center();
    let r = radius(rng, cell);
    let spikes = rng.gen_range(4..=6);
    let points = regular_star(c, r, r * STAR_INNER_RATIO, spikes);
    let angle = rng.gen_range(-180.0..180.0);
    rotate_polygon(&points, angle, Some(polygon_centroid(&points)))
}

pub fn debris_polygon<R: Rng + ?Sized>(rng: &mut R, kind: DecoyKind, cell: &BoundingBox) -> Vec<Point> {
    match kind {
        DecoyKind::Triangle => triangle(rng, cell),
        DecoyKind::Star => star(rng, cell),
    }
}

/// Draw one debris figure, either filled or as an outline.
pub fn paint_debris<B: DrawingBackend + ?Sized, R: Rng + ?Sized>(
    backend: &mut B,
    rng: &mut R,
    kind: DecoyKind,
    cell: &BoundingBox,
    color: &ColorRgba,
) {
    let points = debris_polygon(rng, kind, cell);
    if rng.gen_bool(0.5) {
        paint_polygon(backend, &points, Some(color), None, 1.0);
    } else {
        let thickness = rng.gen_range(1.0..=2.5);
        paint_polygon(backend, &points, None, Some(color), thickness);
    }
}
