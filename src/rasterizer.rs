//! Anti-aliased polygon scan conversion.
//!
//! Edges are collected in floating point and swept one pixel row at a time.
//! Each row is sampled at [`SUBSAMPLES`] sub-scanlines; on each sub-scanline
//! the crossings are sorted and the inside spans (per the filling rule) add
//! their exact horizontal coverage into a row accumulator. The accumulated
//! coverage is handed to [`Raster::blend_solid_hspan`].

use crate::color::Rgba8;
use crate::geometry::Point;
use crate::path_storage::Path;
use crate::pixfmt_rgba::{CoverType, Raster};

/// Vertical samples per pixel row.
pub const SUBSAMPLES: u32 = 5;

/// Filling rule for polygon rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    /// +1 for downward edges, -1 for upward ones.
    dir: i32,
}

impl Edge {
    fn new(a: Point, b: Point) -> Option<Self> {
        if a.y == b.y || !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return None;
        }
        let (top, bottom, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Self {
            x0: top.x,
            y0: top.y,
            x1: bottom.x,
            y1: bottom.y,
            dir,
        })
    }

    #[inline]
    fn x_at(&self, y: f64) -> f64 {
        self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0)
    }
}

/// Polygon rasterizer with sub-scanline anti-aliasing.
#[derive(Debug, Clone, Default)]
pub struct RasterizerScanline {
    edges: Vec<Edge>,
    filling_rule: FillingRule,
    start: Option<Point>,
    last: Option<Point>,
}

impl RasterizerScanline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all edges.
    pub fn reset(&mut self) {
        self.edges.clear();
        self.start = None;
        self.last = None;
    }

    pub fn filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.close_polygon();
        let p = Point::new(x, y);
        self.start = Some(p);
        self.last = Some(p);
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        match self.last {
            Some(last) => {
                self.edges.extend(Edge::new(last, p));
                self.last = Some(p);
            }
            None => self.move_to_d(x, y),
        }
    }

    /// Connect the current sub-path back to its start. Every sub-path is
    /// implicitly closed, since filling is only defined for closed shapes.
    pub fn close_polygon(&mut self) {
        if let (Some(start), Some(last)) = (self.start, self.last) {
            self.edges.extend(Edge::new(last, start));
        }
        self.start = None;
        self.last = None;
    }

    pub fn add_polygon(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.move_to_d(first.x, first.y);
        for p in rest {
            self.line_to_d(p.x, p.y);
        }
        self.close_polygon();
    }

    pub fn add_path(&mut self, path: &Path) {
        for contour in path.flatten() {
            self.add_polygon(&contour.points);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.start.is_none()
    }

    fn is_inside(&self, winding: i32) -> bool {
        match self.filling_rule {
            FillingRule::NonZero => winding != 0,
            FillingRule::EvenOdd => winding & 1 != 0,
        }
    }

    /// Sweep all edges and blend `color` into `ren` by coverage.
    /// Returns `false` if there was nothing to draw.
    pub fn render<R: Raster + ?Sized>(&mut self, ren: &mut R, color: &Rgba8) -> bool {
        self.close_polygon();
        if self.edges.is_empty() || ren.width() == 0 || ren.height() == 0 {
            return false;
        }
        let width = ren.width() as usize;
        let min_y = self.edges.iter().map(|e| e.y0).fold(f64::MAX, f64::min);
        let max_y = self.edges.iter().map(|e| e.y1).fold(f64::MIN, f64::max);
        let row_start = min_y.floor().max(0.0) as u32;
        let row_end = (max_y.ceil().max(0.0) as u32).min(ren.height());

        let weight = 1.0 / SUBSAMPLES as f64;
        let mut coverage = vec![0.0f64; width + 1];
        let mut covers: Vec<CoverType> = Vec::with_capacity(width);
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        let mut drew = false;

        for row in row_start..row_end {
            coverage.iter_mut().for_each(|c| *c = 0.0);
            let mut span_min = width;
            let mut span_max = 0usize;

            for k in 0..SUBSAMPLES {
                let sy = row as f64 + (k as f64 + 0.5) * weight;
                crossings.clear();
                crossings.extend(
                    self.edges
                        .iter()
                        .filter(|e| e.y0 <= sy && sy < e.y1)
                        .map(|e| (e.x_at(sy), e.dir)),
                );
                if crossings.is_empty() {
                    continue;
                }
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut winding = 0;
                let mut span_start = 0.0;
                for &(x, dir) in &crossings {
                    let was_inside = self.is_inside(winding);
                    winding += dir;
                    let inside = self.is_inside(winding);
                    if !was_inside && inside {
                        span_start = x;
                    } else if was_inside && !inside {
                        if let Some((lo, hi)) =
                            accumulate_span(&mut coverage, width, span_start, x, weight)
                        {
                            span_min = span_min.min(lo);
                            span_max = span_max.max(hi);
                        }
                    }
                }
            }

            if span_min >= span_max {
                continue;
            }
            covers.clear();
            covers.extend(
                coverage[span_min..span_max]
                    .iter()
                    .map(|&c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as CoverType),
            );
            ren.blend_solid_hspan(span_min as i32, row as i32, color, &covers);
            drew = true;
        }
        self.reset();
        drew
    }
}

/// Add `weight` times the covered fraction of `[x0, x1)` to each pixel.
/// Returns the touched pixel range `[lo, hi)`.
fn accumulate_span(
    coverage: &mut [f64],
    width: usize,
    x0: f64,
    x1: f64,
    weight: f64,
) -> Option<(usize, usize)> {
    let a = x0.clamp(0.0, width as f64);
    let b = x1.clamp(0.0, width as f64);
    if b <= a {
        return None;
    }
    let ia = a.floor() as usize;
    let ib = b.floor() as usize;
    if ia == ib {
        coverage[ia] += (b - a) * weight;
        return Some((ia, (ia + 1).min(width)));
    }
    coverage[ia] += (ia as f64 + 1.0 - a) * weight;
    for c in &mut coverage[ia + 1..ib] {
        *c += weight;
    }
    if ib < width {
        coverage[ib] += (b - ib as f64) * weight;
    }
    Some((ia, (ib + 1).min(width)))
}
