//! TrueType font engine using `ttf-parser`.
//!
//! Loads a TTF/OTF face and converts glyph outlines into [`Path`]s in pixel
//! units, ready for the scanline rasterizer. No hinting is applied.

use crate::error::{Error, Result};
use crate::geometry::{rotate_point, BoundingBox, Point};
use crate::path_storage::Path;

/// Glyph outline and metrics at the engine's current height.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub glyph_index: u16,
    /// Outline with the baseline origin at `(0, 0)`. Empty for blank glyphs.
    pub path: Path,
    pub advance_x: f64,
    /// Outline bounds; `None` for glyphs without an outline (e.g. space).
    pub bounds: Option<BoundingBox>,
}

/// TrueType font engine.
pub struct FontEngine {
    face_data: Vec<u8>,
    face_index: u32,
    /// Desired em-height in pixels.
    height: f64,
    /// Negate Y so it grows downward, as on the raster.
    flip_y: bool,
}

impl FontEngine {
    /// Create a font engine from raw TTF/OTF data.
    ///
    /// `face_index` selects the face in a font collection (0 for single fonts).
    pub fn from_data(data: Vec<u8>, face_index: u32) -> Result<Self> {
        Self::validated(data, face_index, "<memory>")
    }

    /// Load a font file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::validated(data, 0, &path.display().to_string())
    }

    fn validated(data: Vec<u8>, face_index: u32, origin: &str) -> Result<Self> {
        ttf_parser::Face::parse(&data, face_index).map_err(|e| Error::Font {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            face_data: data,
            face_index,
            height: 12.0,
            flip_y: false,
        })
    }

    pub fn set_height(&mut self, h: f64) {
        self.height = h;
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_flip_y(&mut self, flip: bool) {
        self.flip_y = flip;
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.face().and_then(|f| f.glyph_index(ch)).is_some()
    }

    /// Outline and metrics of `ch`, or `None` if the font has no mapping.
    pub fn glyph(&self, ch: char) -> Option<Glyph> {
        let face = self.face()?;
        let id = face.glyph_index(ch)?;
        let scale = self.scale(&face);
        let advance_x = face
            .glyph_hor_advance(id)
            .map(|a| a as f64 * scale)
            .unwrap_or(0.0);

        let mut collector = OutlineCollector::new(scale, self.flip_y);
        let bounds = face.outline_glyph(id, &mut collector).map(|r| {
            let y_sign = if self.flip_y { -1.0 } else { 1.0 };
            BoundingBox::new(
                Point::new(r.x_min as f64 * scale, r.y_min as f64 * scale * y_sign),
                Point::new(r.x_max as f64 * scale, r.y_max as f64 * scale * y_sign),
            )
        });
        Some(Glyph {
            glyph_index: id.0,
            path: collector.path,
            advance_x,
            bounds,
        })
    }

    // -- Internal helpers --

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.face_data, self.face_index).ok()
    }

    fn scale(&self, face: &ttf_parser::Face<'_>) -> f64 {
        self.height / face.units_per_em().max(1) as f64
    }
}

/// Place a y-down glyph outline into `cell`: the baseline origin goes to
/// the cell's bottom-left corner, then the whole outline is rotated by
/// `angle_deg` about the cell center.
pub fn place_glyph_in_cell(glyph: &Path, cell: &BoundingBox, angle_deg: f64) -> Path {
    let mut path = glyph.clone();
    let center = cell.center();
    path.translate(cell.lt.x, cell.rb.y);
    path.transform(&|p: Point| rotate_point(&p, angle_deg, &center));
    path
}

// ============================================================================
// OutlineCollector: ttf_parser::OutlineBuilder into a Path
// ============================================================================

/// Collects glyph outline commands into a [`Path`].
struct OutlineCollector {
    path: Path,
    scale: f64,
    flip_y: bool,
}

impl OutlineCollector {
    fn new(scale: f64, flip_y: bool) -> Self {
        Self {
            path: Path::new(),
            scale,
            flip_y,
        }
    }

    #[inline]
    fn sx(&self, v: f32) -> f64 {
        v as f64 * self.scale
    }

    #[inline]
    fn sy(&self, v: f32) -> f64 {
        let y = v as f64 * self.scale;
        if self.flip_y {
            -y
        } else {
            y
        }
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (cx, cy, x, y) = (self.sx(x1), self.sy(y1), self.sx(x), self.sy(y));
        self.path.curve3(cx, cy, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = Point::new(self.sx(x1), self.sy(y1));
        let c2 = Point::new(self.sx(x2), self.sy(y2));
        let to = Point::new(self.sx(x), self.sy(y));
        self.path.curve4(c1, c2, to);
    }

    fn close(&mut self) {
        self.path.close_polygon();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_storage::PathCommand;
    use ttf_parser::OutlineBuilder;

    #[test]
    fn test_outline_collector_scale_and_flip() {
        let c = OutlineCollector::new(2.0, false);
        assert!((c.sx(10.0) - 20.0).abs() < 1e-10);
        assert!((c.sy(10.0) - 20.0).abs() < 1e-10);
        let c = OutlineCollector::new(1.0, true);
        assert!((c.sy(10.0) + 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_outline_collector_commands() {
        let mut c = OutlineCollector::new(1.0, false);
        c.move_to(10.0, 20.0);
        c.line_to(30.0, 40.0);
        c.quad_to(50.0, 60.0, 70.0, 80.0);
        c.curve_to(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        c.close();
        let cmds = c.path.commands();
        assert_eq!(cmds.len(), 5);
        assert_eq!(cmds[0], PathCommand::MoveTo(Point::new(10.0, 20.0)));
        assert_eq!(cmds[1], PathCommand::LineTo(Point::new(30.0, 40.0)));
        assert_eq!(
            cmds[2],
            PathCommand::Curve3(Point::new(50.0, 60.0), Point::new(70.0, 80.0))
        );
        assert!(matches!(cmds[3], PathCommand::Curve4(..)));
        assert_eq!(cmds[4], PathCommand::Close);
    }

    #[test]
    fn test_invalid_font_data() {
        let err = FontEngine::from_data(vec![0, 1, 2, 3], 0).err();
        assert!(matches!(err, Some(Error::Font { .. })));
    }

    #[test]
    fn test_missing_font_file() {
        let err = FontEngine::from_file("/nonexistent/font-that-does-not-exist.ttf").err();
        assert!(matches!(err, Some(Error::Io(_))));
    }

    #[test]
    fn test_place_glyph_without_rotation() {
        let glyph = Path::from_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, -6.0),
        ]);
        let cell = BoundingBox::from_xywh(10.0, 20.0, 8.0, 10.0);
        let placed = place_glyph_in_cell(&glyph, &cell, 0.0);
        let b = placed.bounding_rect().unwrap();
        assert_eq!(b.lt, Point::new(10.0, 24.0));
        assert_eq!(b.rb, Point::new(14.0, 30.0));
    }

    #[test]
    fn test_place_glyph_rotates_about_cell_center() {
        let glyph = Path::from_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, -2.0),
        ]);
        let cell = BoundingBox::from_xywh(0.0, 0.0, 10.0, 10.0);
        let placed = place_glyph_in_cell(&glyph, &cell, 180.0);
        // The bottom-left corner maps to the top-right one.
        let b = placed.bounding_rect().unwrap();
        assert!((b.rb.x - 10.0).abs() < 1e-9);
        assert!(b.lt.y.abs() < 1e-9);
    }
}
