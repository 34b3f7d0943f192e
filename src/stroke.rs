//! Stroke generation: polyline → fillable outline polygons.
//!
//! Each segment becomes a quad of the stroke width; joints get a join patch.
//! All emitted polygons share one orientation, so rasterizing them together
//! with the non-zero rule yields their union without cancellation.

use crate::basics::PI;
use crate::geometry::{signed_area2, Point};

/// Line join style at polyline corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub line_join: LineJoin,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            line_join: LineJoin::Round,
        }
    }
}

/// Outline polygons covering the stroke of `points`.
///
/// `closed` adds the segment from the last point back to the first.
pub fn stroke_polygons(points: &[Point], closed: bool, style: &StrokeStyle) -> Vec<Vec<Point>> {
    let half = style.width.abs() / 2.0;
    if half == 0.0 || points.len() < 2 {
        return Vec::new();
    }
    let mut vertices: Vec<Point> = points.to_vec();
    vertices.dedup();
    if closed && vertices.len() > 2 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 2 {
        return Vec::new();
    }

    let n = vertices.len();
    let segment_count = if closed && n > 2 { n } else { n - 1 };
    let mut out = Vec::with_capacity(segment_count * 2);
    let mut normals = Vec::with_capacity(segment_count);

    for i in 0..segment_count {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let len = a.distance(&b);
        let nx = -(b.y - a.y) / len * half;
        let ny = (b.x - a.x) / len * half;
        normals.push((nx, ny));
        out.push(oriented(vec![
            a.translate(nx, ny),
            b.translate(nx, ny),
            b.translate(-nx, -ny),
            a.translate(-nx, -ny),
        ]));
    }

    // Interior joints, plus the wrap-around joint of a closed outline.
    let joints: Vec<(usize, usize, usize)> = if segment_count == n {
        (0..n).map(|i| ((i + n - 1) % n, i, i)).collect()
    } else {
        (1..n - 1).map(|i| (i - 1, i, i)).collect()
    };
    for (prev_seg, vertex, next_seg) in joints {
        let v = vertices[vertex];
        match style.line_join {
            LineJoin::Round => out.push(disc(v, half)),
            LineJoin::Bevel => {
                let (pnx, pny) = normals[prev_seg];
                let (nnx, nny) = normals[next_seg];
                out.push(oriented(vec![v, v.translate(pnx, pny), v.translate(nnx, nny)]));
                out.push(oriented(vec![v, v.translate(-pnx, -pny), v.translate(-nnx, -nny)]));
            }
        }
    }
    out.retain(|poly| signed_area2(poly) != 0.0);
    out
}

fn oriented(mut poly: Vec<Point>) -> Vec<Point> {
    if signed_area2(&poly) < 0.0 {
        poly.reverse();
    }
    poly
}

/// Regular polygon approximating a disc, in the shared orientation.
fn disc(center: Point, radius: f64) -> Vec<Point> {
    let steps = ((radius * 2.0 * PI / 2.0).ceil() as usize).clamp(8, 64);
    (0..steps)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / steps as f64;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}
