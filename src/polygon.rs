//! Filled and stroked polygon painting.
//!
//! [`paint_polygon`] talks to a [`DrawingBackend`]; [`RasterPainter`] is the
//! backend that rasterizes onto any [`Raster`].

use crate::color::{ColorRgba, Rgba8};
use crate::geometry::Point;
use crate::path_storage::Path;
use crate::pixfmt_rgba::Raster;
use crate::rasterizer::RasterizerScanline;
use crate::stroke::{stroke_polygons, StrokeStyle};

/// Primitive drawing operations a polygon painter needs.
pub trait DrawingBackend {
    fn fill_polygon(&mut self, points: &[Point], color: &ColorRgba);
    fn stroke_polygon(&mut self, points: &[Point], color: &ColorRgba, thickness: f64);
}

/// Paint a closed polygon: fill first, then stroke, so the inner half of the
/// stroke lies over the fill edge.
pub fn paint_polygon<B: DrawingBackend + ?Sized>(
    backend: &mut B,
    points: &[Point],
    fill: Option<&ColorRgba>,
    stroke: Option<&ColorRgba>,
    thickness: f64,
) {
    if points.len() < 3 {
        return;
    }
    if let Some(fill) = fill {
        backend.fill_polygon(points, fill);
    }
    if let Some(stroke) = stroke {
        backend.stroke_polygon(points, stroke, thickness);
    }
}

// ============================================================================
// RasterPainter
// ============================================================================

/// Anti-aliased drawing onto a [`Raster`].
pub struct RasterPainter<'a, R: Raster + ?Sized> {
    ren: &'a mut R,
    ras: RasterizerScanline,
}

impl<'a, R: Raster + ?Sized> RasterPainter<'a, R> {
    pub fn new(ren: &'a mut R) -> Self {
        Self {
            ren,
            ras: RasterizerScanline::new(),
        }
    }

    pub fn ren(&self) -> &R {
        &*self.ren
    }

    pub fn ren_mut(&mut self) -> &mut R {
        &mut *self.ren
    }

    /// Fill every sub-path of `path` (non-zero rule).
    pub fn fill_path(&mut self, path: &Path, color: &ColorRgba) {
        self.ras.reset();
        self.ras.add_path(path);
        self.ras.render(&mut *self.ren, &Rgba8::from(*color));
    }
}

impl<R: Raster + ?Sized> DrawingBackend for RasterPainter<'_, R> {
    fn fill_polygon(&mut self, points: &[Point], color: &ColorRgba) {
        self.ras.reset();
        self.ras.add_polygon(points);
        self.ras.render(&mut *self.ren, &Rgba8::from(*color));
    }

    fn stroke_polygon(&mut self, points: &[Point], color: &ColorRgba, thickness: f64) {
        let style = StrokeStyle {
            width: thickness,
            ..StrokeStyle::default()
        };
        self.ras.reset();
        for poly in stroke_polygons(points, true, &style) {
            self.ras.add_polygon(&poly);
        }
        self.ras.render(&mut *self.ren, &Rgba8::from(*color));
    }
}
