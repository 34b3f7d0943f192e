//! CAPTCHA rendering.
//!
//! The stages are:
//! 1. plan the grid and background ([`plan_layout`]),
//! 2. paint the background gradient over the whole canvas,
//! 3. draw each glyph and debris figure in a color contrasting with the
//!    background under its cell,
//! 4. soften everything with a blur pass,
//! 5. encode as PNG.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::blur::stack_blur;
use crate::captcha_layout::{plan_layout, CaptchaLayout, CellRole, LayoutOptions};
use crate::codec::{ImageCrateCodec, ImageFormat, RasterCodec};
use crate::color::{parse_color, ColorRgba};
use crate::color_hsv::{
    complementary_hsv, hsv_to_rgb, random_hsv, rgb_to_hsv, HsvOverrides, HUE_MAX,
};
use crate::debris::paint_debris;
use crate::error::{Error, Result};
use crate::font_engine::{place_glyph_in_cell, FontEngine};
use crate::geometry::BoundingBox;
use crate::gradient::{render_gradient, Interpolation};
use crate::polygon::RasterPainter;
use crate::rendering_buffer::RasterBuffer;

/// Glyph em-height relative to the cell height.
pub const GLYPH_SCALE: f64 = 1.2;
/// Largest glyph tilt either way, in degrees.
pub const MAX_GLYPH_ANGLE: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CaptchaOptions {
    pub width: u32,
    pub height: u32,
    /// CSS-like color the background walk starts from; random if `None`.
    pub background: Option<String>,
    pub rows: usize,
    /// Radius of the final blur; 1 is a 3×3 Gaussian, 0 disables it.
    pub blur_radius: u32,
    pub interpolation: Interpolation,
    /// Margin on each side, as a fraction of the canvas dimension.
    pub padding: f64,
}

impl Default for CaptchaOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 96,
            background: None,
            rows: 3,
            blur_radius: 1,
            interpolation: Interpolation::Cosine,
            padding: 0.1,
        }
    }
}

impl CaptchaOptions {
    fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            rows: self.rows,
            padding: self.padding,
            interpolation: self.interpolation,
            seed_color: self.background.as_deref().map(|s| {
                let mut hsv = rgb_to_hsv(&parse_color(s));
                hsv.a = None;
                hsv
            }),
        }
    }
}

/// Color for a figure drawn over `background`: its complement, or a random
/// dark, semi-transparent color when the background is unknown.
pub fn contrasting_color<R: Rng + ?Sized>(rng: &mut R, background: Option<&ColorRgba>) -> ColorRgba {
    match background {
        Some(bg) => {
            let mut hsv = complementary_hsv(&rgb_to_hsv(bg), HUE_MAX);
            hsv.a = None;
            hsv_to_rgb(&hsv.clamped(HUE_MAX))
        }
        None => {
            let overrides = HsvOverrides {
                v: Some(rng.gen_range(0.0..=30.0)),
                a: Some(rng.gen_range(20.0..=50.0)),
                ..HsvOverrides::default()
            };
            hsv_to_rgb(&random_hsv(rng, overrides))
        }
    }
}

/// Draw `ch` into `cell` with a random font that has it. Returns `false`
/// when no font maps the character.
fn draw_glyph<R: Rng + ?Sized>(
    rng: &mut R,
    painter: &mut RasterPainter<'_, RasterBuffer>,
    fonts: &mut [FontEngine],
    ch: char,
    cell: &BoundingBox,
    color: &ColorRgba,
) -> bool {
    let mut candidates: Vec<usize> = (0..fonts.len()).filter(|&i| fonts[i].has_glyph(ch)).collect();
    candidates.shuffle(rng);
    let Some(&index) = candidates.first() else {
        log::warn!("no font has a glyph for {ch:?}");
        return false;
    };
    let font = &mut fonts[index];
    font.set_flip_y(true);
    font.set_height(cell.height() * GLYPH_SCALE);
    let Some(glyph) = font.glyph(ch) else {
        return false;
    };
    let angle = rng.gen_range(-MAX_GLYPH_ANGLE..=MAX_GLYPH_ANGLE);
    let path = place_glyph_in_cell(&glyph.path, cell, angle);
    painter.fill_path(&path, color);
    true
}

/// Paint the background, glyphs and debris of `layout`.
pub fn render_layout<R: Rng + ?Sized>(
    rng: &mut R,
    layout: &CaptchaLayout,
    fonts: &mut [FontEngine],
    blur_radius: u32,
) -> RasterBuffer {
    let mut buf = RasterBuffer::new(layout.width, layout.height);
    let canvas = BoundingBox::from_xywh(0.0, 0.0, layout.width as f64, layout.height as f64);
    render_gradient(&mut buf, &canvas, &layout.vector, &layout.nodes, layout.interpolation);

    let mut painter = RasterPainter::new(&mut buf);
    for cell in &layout.cells {
        let color = contrasting_color(rng, cell.background.as_ref());
        match cell.role {
            CellRole::Glyph { ch, .. } => {
                draw_glyph(rng, &mut painter, fonts, ch, &cell.bbox, &color);
            }
            CellRole::Decoy(kind) => paint_debris(&mut painter, rng, kind, &cell.bbox, &color),
            CellRole::Empty => {}
        }
    }

    stack_blur(&mut buf, blur_radius, blur_radius);
    buf
}

/// Render `challenge` to a raster.
pub fn render_captcha<R: Rng + ?Sized>(
    rng: &mut R,
    challenge: &str,
    fonts: &mut [FontEngine],
    options: &CaptchaOptions,
) -> Result<RasterBuffer> {
    if fonts.is_empty() {
        return Err(Error::NoFontsAvailable);
    }
    let layout = plan_layout(rng, challenge, options.width, options.height, &options.layout_options());
    Ok(render_layout(rng, &layout, fonts, options.blur_radius))
}

/// PNG bytes of `buf`, or an empty vector if encoding fails.
pub fn encode_captcha<C: RasterCodec + ?Sized>(codec: &C, buf: &RasterBuffer) -> Vec<u8> {
    match codec.encode(buf, ImageFormat::Png, 100, 6) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("captcha encoding failed: {e}");
            Vec::new()
        }
    }
}

/// Load every readable font in `paths`; unreadable ones are skipped.
pub fn load_fonts<P: AsRef<std::path::Path>>(paths: &[P]) -> Vec<FontEngine> {
    paths
        .iter()
        .filter_map(|p| match FontEngine::from_file(p) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("skipping font {}: {e}", p.as_ref().display());
                None
            }
        })
        .collect()
}

/// Render `challenge` as a PNG using the thread-local generator.
pub fn make_captcha_image<P: AsRef<std::path::Path>>(
    challenge: &str,
    font_paths: &[P],
    options: &CaptchaOptions,
) -> Result<Vec<u8>> {
    make_captcha_image_with_rng(&mut rand::thread_rng(), challenge, font_paths, options)
}

/// Render `challenge` as a PNG.
///
/// Fails with [`Error::NoFontsAvailable`] when none of `font_paths` can be
/// loaded. An encoding failure yields `Ok` with empty bytes.
pub fn make_captcha_image_with_rng<R: Rng + ?Sized, P: AsRef<std::path::Path>>(
    rng: &mut R,
    challenge: &str,
    font_paths: &[P],
    options: &CaptchaOptions,
) -> Result<Vec<u8>> {
    let mut fonts = load_fonts(font_paths);
    let buf = render_captcha(rng, challenge, &mut fonts, options)?;
    Ok(encode_captcha(&ImageCrateCodec, &buf))
}
