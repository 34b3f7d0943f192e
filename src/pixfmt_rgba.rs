//! The raster contract and RGBA blending.
//!
//! [`Raster`] is the abstract mutable 2D pixel surface every painter in this
//! crate draws onto: `width`, `height`, `pixel` and `copy_pixel`. The blending
//! operations have default implementations on top of those four, so any
//! surface that can read and write single pixels gets anti-aliased drawing
//! for free. [`RasterBuffer`] overrides the span operations with direct row
//! access.

use crate::color::Rgba8;
use crate::rendering_buffer::{RasterBuffer, BPP};

/// Anti-aliasing coverage value, 255 = fully covered.
pub type CoverType = u8;
pub const COVER_FULL: CoverType = 255;

// ============================================================================
// Raster trait
// ============================================================================

pub trait Raster {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Pixel at `(x, y)`. Callers keep coordinates in bounds.
    fn pixel(&self, x: i32, y: i32) -> Rgba8;

    /// Overwrite the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8);

    /// Blend `c` over the pixel at `(x, y)` with coverage `cover`.
    fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8, cover: CoverType) {
        let alpha = Rgba8::multiply(c.a, cover);
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.copy_pixel(x, y, &Rgba8::new(c.r, c.g, c.b, 255));
            return;
        }
        let p = self.pixel(x, y);
        self.copy_pixel(x, y, &blend_over(p, c, alpha));
    }

    /// Blend a horizontal run of `len` pixels with uniform coverage.
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, cover: CoverType) {
        for i in 0..len as i32 {
            self.blend_pixel(x + i, y, c, cover);
        }
    }

    /// Blend a horizontal span with per-pixel coverage.
    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Rgba8, covers: &[CoverType]) {
        for (i, &cover) in covers.iter().enumerate() {
            self.blend_pixel(x + i as i32, y, c, cover);
        }
    }
}

/// Non-premultiplied "source over" with an effective source alpha.
#[inline]
pub fn blend_over(dst: Rgba8, src: &Rgba8, alpha: u8) -> Rgba8 {
    Rgba8::new(
        Rgba8::lerp(dst.r, src.r, alpha),
        Rgba8::lerp(dst.g, src.g, alpha),
        Rgba8::lerp(dst.b, src.b, alpha),
        Rgba8::lerp(dst.a, 255, alpha),
    )
}

// ============================================================================
// RasterBuffer implementation
// ============================================================================

impl Raster for RasterBuffer {
    fn width(&self) -> u32 {
        RasterBuffer::width(self)
    }

    fn height(&self) -> u32 {
        RasterBuffer::height(self)
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        self.get(x, y).unwrap_or_default()
    }

    fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8) {
        self.put(x, y, *c);
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Rgba8, covers: &[CoverType]) {
        if y < 0 || y as u32 >= RasterBuffer::height(self) {
            return;
        }
        let w = RasterBuffer::width(self) as i32;
        let row = self.row_mut(y as u32);
        for (i, &cover) in covers.iter().enumerate() {
            let px = x + i as i32;
            if px < 0 || px >= w {
                continue;
            }
            let alpha = Rgba8::multiply(c.a, cover);
            if alpha == 0 {
                continue;
            }
            let off = px as usize * BPP;
            let p = &mut row[off..off + BPP];
            let out = if alpha == 255 {
                Rgba8::new(c.r, c.g, c.b, 255)
            } else {
                blend_over(Rgba8::new(p[0], p[1], p[2], p[3]), c, alpha)
            };
            p.copy_from_slice(&[out.r, out.g, out.b, out.a]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_pixel_full_cover_is_copy() {
        let mut buf = RasterBuffer::new(4, 4);
        let red = Rgba8::new_opaque(255, 0, 0);
        buf.blend_pixel(1, 1, &red, COVER_FULL);
        assert_eq!(buf.pixel(1, 1), red);
    }

    #[test]
    fn test_blend_pixel_half_cover() {
        let mut buf = RasterBuffer::filled(2, 2, Rgba8::new_opaque(0, 0, 0));
        buf.blend_pixel(0, 0, &Rgba8::new_opaque(255, 255, 255), 128);
        let p = buf.pixel(0, 0);
        assert!((p.r as i32 - 128).abs() <= 1, "r={}", p.r);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let mut buf = RasterBuffer::filled(2, 2, Rgba8::new_opaque(9, 9, 9));
        buf.blend_pixel(0, 0, &Rgba8::new(255, 0, 0, 0), COVER_FULL);
        assert_eq!(buf.pixel(0, 0), Rgba8::new_opaque(9, 9, 9));
    }

    #[test]
    fn test_blend_solid_hspan_clips() {
        let mut buf = RasterBuffer::new(3, 1);
        let c = Rgba8::new_opaque(0, 255, 0);
        buf.blend_solid_hspan(-1, 0, &c, &[255, 255, 255, 255, 255]);
        for x in 0..3 {
            assert_eq!(buf.pixel(x, 0), c);
        }
        buf.blend_solid_hspan(0, 5, &c, &[255]);
    }

    struct Recorder {
        writes: Vec<(i32, i32)>,
    }

    impl Raster for Recorder {
        fn width(&self) -> u32 {
            8
        }
        fn height(&self) -> u32 {
            8
        }
        fn pixel(&self, _x: i32, _y: i32) -> Rgba8 {
            Rgba8::transparent()
        }
        fn copy_pixel(&mut self, x: i32, y: i32, _c: &Rgba8) {
            self.writes.push((x, y));
        }
    }

    #[test]
    fn test_default_hline_uses_copy_pixel() {
        let mut r = Recorder { writes: Vec::new() };
        r.blend_hline(2, 3, 3, &Rgba8::new_opaque(1, 1, 1), COVER_FULL);
        assert_eq!(r.writes, vec![(2, 3), (3, 3), (4, 3)]);
    }
}
