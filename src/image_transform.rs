//! Staged raster transform pipeline.
//!
//! Stages run in a fixed order, each one optional:
//! rotate → crop → resize → watermark → format selection.
//! Format selection skips re-encoding entirely when nothing changed and the
//! source format is acceptable.

use crate::basics::{iround, uround};
use crate::codec::{ImageCrateCodec, ImageFormat, RasterCodec};
use crate::color::Rgba8;
use crate::error::{Error, Result};
use crate::geometry::{polygon_bounds, rotate_point, BoundingBox, Point};
use crate::orientation::Orientation;
use crate::pixfmt_rgba::Raster;
use crate::rendering_buffer::RasterBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Clockwise degrees. Multiples of 90 are lossless.
    Degrees(f64),
    /// Undo the source's EXIF orientation ([`TransformParams::exif_orientation`]).
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CropSpec {
    /// Explicit frame in source pixels, clamped to the image.
    Frame { x: u32, y: u32, width: u32, height: u32 },
    /// Largest frame of aspect `ratio` (`"16:9"`, `"16/9"` or `"1.78"`),
    /// positioned along the trimmed axis by `offset` in `[0, 1]²`.
    Auto { ratio: String, offset: (f64, f64) },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub image: RasterBuffer,
    /// Longer side of the mark relative to the target's shorter side.
    pub size: f64,
    /// Placement in `[0, 1]²`: `(0, 0)` top-left, `(1, 1)` bottom-right.
    pub position: (f64, f64),
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub rotate: Option<Rotation>,
    pub crop: Option<CropSpec>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Allow the resize stage to enlarge.
    pub upscale: bool,
    pub watermark: Option<WatermarkSpec>,
    /// Acceptable output formats; empty accepts any writable format.
    pub formats: Vec<ImageFormat>,
    pub quality: u8,
    pub compression: u8,
    pub source_format: Option<ImageFormat>,
    /// The result goes somewhere other than the source, so it must be
    /// written even when unchanged.
    pub destination_differs: bool,
    /// EXIF orientation tag of the source, used by [`Rotation::Auto`].
    pub exif_orientation: Option<u8>,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            rotate: None,
            crop: None,
            max_width: None,
            max_height: None,
            upscale: false,
            watermark: None,
            formats: Vec::new(),
            quality: 90,
            compression: 6,
            source_format: None,
            destination_differs: false,
            exif_orientation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Nothing to write; the source stays authoritative.
    PassThrough,
    Encoded { format: ImageFormat, bytes: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub buffer: RasterBuffer,
    /// Whether any stage changed pixels.
    pub modified: bool,
    pub output: Output,
}

// ============================================================================
// Sampling helpers
// ============================================================================

/// Accumulates premultiplied samples.
#[derive(Default)]
struct Accum {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
    weight: f64,
}

impl Accum {
    #[inline]
    fn add(&mut self, c: Rgba8, w: f64) {
        let a = c.a as f64 * w;
        self.r += c.r as f64 * a;
        self.g += c.g as f64 * a;
        self.b += c.b as f64 * a;
        self.a += a;
        self.weight += w;
    }

    fn finish(&self) -> Rgba8 {
        if self.a <= 0.0 || self.weight <= 0.0 {
            return Rgba8::transparent();
        }
        let ch = |v: f64| uround((v / self.a).clamp(0.0, 255.0)) as u8;
        Rgba8::new(
            ch(self.r),
            ch(self.g),
            ch(self.b),
            uround((self.a / self.weight).clamp(0.0, 255.0)) as u8,
        )
    }
}

/// Bilinear sample at continuous pixel coordinates (pixel centers at
/// integers). Taps outside the image count as transparent.
fn sample_bilinear(src: &RasterBuffer, x: f64, y: f64) -> Rgba8 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i32, y0 as i32);
    let mut acc = Accum::default();
    for (dx, dy, w) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        let c = src.get(x0 + dx, y0 + dy).unwrap_or_else(Rgba8::transparent);
        acc.add(c, w);
    }
    acc.finish()
}

/// Resize `src` to `width × height`: bilinear, or an area average when
/// shrinking by more than half on an axis.
pub fn resample(src: &RasterBuffer, width: u32, height: u32) -> RasterBuffer {
    let mut dst = RasterBuffer::new(width, height);
    if src.is_empty() || dst.is_empty() {
        return dst;
    }
    let sx = src.width() as f64 / width as f64;
    let sy = src.height() as f64 / height as f64;
    let box_filter = sx > 2.0 || sy > 2.0;
    let max_x = src.width() as f64 - 1.0;
    let max_y = src.height() as f64 - 1.0;

    for y in 0..height {
        for x in 0..width {
            let c = if box_filter {
                let x0 = (x as f64 * sx).floor() as i32;
                let y0 = (y as f64 * sy).floor() as i32;
                let x1 = (((x + 1) as f64 * sx).ceil() as i32).max(x0 + 1).min(src.width() as i32);
                let y1 = (((y + 1) as f64 * sy).ceil() as i32).max(y0 + 1).min(src.height() as i32);
                let mut acc = Accum::default();
                for yy in y0..y1 {
                    for xx in x0..x1 {
                        acc.add(src.pixel(xx, yy), 1.0);
                    }
                }
                acc.finish()
            } else {
                let px = ((x as f64 + 0.5) * sx - 0.5).clamp(0.0, max_x);
                let py = ((y as f64 + 0.5) * sy - 0.5).clamp(0.0, max_y);
                sample_bilinear(src, px, py)
            };
            dst.copy_pixel(x as i32, y as i32, &c);
        }
    }
    dst
}

// ============================================================================
// Stages
// ============================================================================

/// Rotate clockwise by `degrees`. Right angles move pixels losslessly; other
/// angles resample bilinearly onto a canvas that fits the rotated image,
/// leaving uncovered corners transparent.
pub fn rotate_image(src: &RasterBuffer, degrees: f64) -> RasterBuffer {
    if let Some(o) = Orientation::from_degrees(degrees) {
        return o.apply(src);
    }
    let (w, h) = (src.width() as f64, src.height() as f64);
    let center = Point::new(w / 2.0, h / 2.0);
    // Forward mapping is a clockwise turn; `rotate_point` with the same
    // angle is its inverse.
    let corners = BoundingBox::from_xywh(0.0, 0.0, w, h).corners();
    let turned: Vec<Point> = corners
        .iter()
        .map(|p| rotate_point(p, -degrees, &center))
        .collect();
    let Some(bounds) = polygon_bounds(&turned) else {
        return src.clone();
    };
    let nw = ((bounds.width() - 1e-6).ceil().max(1.0)) as u32;
    let nh = ((bounds.height() - 1e-6).ceil().max(1.0)) as u32;

    let mut dst = RasterBuffer::new(nw, nh);
    let shift = Point::new(w / 2.0 - nw as f64 / 2.0, h / 2.0 - nh as f64 / 2.0);
    for y in 0..nh {
        for x in 0..nw {
            let p = Point::new(x as f64 + 0.5 + shift.x, y as f64 + 0.5 + shift.y);
            let s = rotate_point(&p, degrees, &center);
            let c = sample_bilinear(src, s.x - 0.5, s.y - 0.5);
            dst.copy_pixel(x as i32, y as i32, &c);
        }
    }
    dst
}

/// Parse an aspect ratio: `"w:h"`, `"w/h"` or a plain number.
pub fn parse_ratio(s: &str) -> Option<f64> {
    let s = s.trim();
    let ratio = match s.split_once([':', '/']) {
        Some((a, b)) => a.trim().parse::<f64>().ok()? / b.trim().parse::<f64>().ok()?,
        None => s.parse::<f64>().ok()?,
    };
    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

/// Largest `ratio`-shaped frame inside `width × height`, as
/// `(x, y, w, h)`. `offset` positions it along the trimmed axis. An empty
/// image yields its own (empty) frame.
pub fn autocrop_frame(width: u32, height: u32, ratio: f64, offset: (f64, f64)) -> (u32, u32, u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0, width, height);
    }
    let (w, h) = (width as f64, height as f64);
    let ox = offset.0.clamp(0.0, 1.0);
    let oy = offset.1.clamp(0.0, 1.0);
    if w / h > ratio {
        let cw = uround(h * ratio).clamp(1, width);
        let x = uround((width - cw) as f64 * ox);
        (x, 0, cw, height)
    } else {
        let ch = uround(w / ratio).clamp(1, height);
        let y = uround((height - ch) as f64 * oy);
        (0, y, width, ch)
    }
}

fn crop_frame(width: u32, height: u32, spec: &CropSpec) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let frame = match spec {
        CropSpec::Frame { x, y, width: fw, height: fh } => {
            let x = (*x).min(width);
            let y = (*y).min(height);
            (x, y, (*fw).min(width - x), (*fh).min(height - y))
        }
        CropSpec::Auto { ratio, offset } => match parse_ratio(ratio) {
            Some(r) => autocrop_frame(width, height, r, *offset),
            None => {
                log::warn!("unparseable crop ratio {ratio:?}, not cropping");
                return None;
            }
        },
    };
    if frame.2 == 0 || frame.3 == 0 {
        log::warn!("crop frame {frame:?} is empty, not cropping");
        return None;
    }
    (frame != (0, 0, width, height)).then_some(frame)
}

/// Scale factor for the resize stage, or `None` when it should be skipped.
pub fn resize_scale(width: u32, height: u32, max_width: Option<u32>, max_height: Option<u32>, upscale: bool) -> Option<f64> {
    if width == 0 || height == 0 {
        return None;
    }
    let sw = max_width.filter(|&m| m > 0).map(|m| m as f64 / width as f64);
    let sh = max_height.filter(|&m| m > 0).map(|m| m as f64 / height as f64);
    let scale = match (sw, sh) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    if scale == 1.0 || (scale > 1.0 && !upscale) {
        return None;
    }
    Some(scale)
}

/// Mark size and top-left position on a `target_w × target_h` image.
pub fn watermark_placement(target_w: u32, target_h: u32, mark_w: u32, mark_h: u32, spec_size: f64, position: (f64, f64)) -> (i32, i32, u32, u32) {
    let longest = (spec_size.max(0.0) * target_w.min(target_h) as f64).max(1.0);
    let k = longest / mark_w.max(mark_h).max(1) as f64;
    let w = uround(mark_w as f64 * k).max(1);
    let h = uround(mark_h as f64 * k).max(1);
    let x = iround((target_w as f64 - w as f64) * position.0.clamp(0.0, 1.0));
    let y = iround((target_h as f64 - h as f64) * position.1.clamp(0.0, 1.0));
    (x, y, w, h)
}

/// Composite `spec.image` onto `dst`. Returns `false` if nothing was drawn.
pub fn apply_watermark(dst: &mut RasterBuffer, spec: &WatermarkSpec) -> bool {
    if spec.image.is_empty() || dst.is_empty() || spec.opacity <= 0.0 {
        return false;
    }
    let (x, y, w, h) = watermark_placement(
        dst.width(),
        dst.height(),
        spec.image.width(),
        spec.image.height(),
        spec.size,
        spec.position,
    );
    let mark = resample(&spec.image, w, h);
    let cover = uround(spec.opacity.clamp(0.0, 1.0) * 255.0) as u8;
    for my in 0..h as i32 {
        for mx in 0..w as i32 {
            if dst.in_bounds(x + mx, y + my) {
                dst.blend_pixel(x + mx, y + my, &mark.pixel(mx, my), cover);
            }
        }
    }
    true
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run every requested stage on `source` and encode the result with
/// `codec` unless it can pass through untouched.
pub fn run_pipeline<C: RasterCodec + ?Sized>(codec: &C, source: &RasterBuffer, params: &TransformParams) -> Result<TransformOutcome> {
    // Only set once a stage has changed pixels.
    let mut buf: Option<RasterBuffer> = None;

    // 1. Rotate
    match params.rotate {
        Some(Rotation::Auto) => {
            let o = params
                .exif_orientation
                .and_then(Orientation::from_exif)
                .unwrap_or(Orientation::IDENTITY);
            if o.is_identity() {
                log::debug!("rotate: orientation is already upright");
            } else {
                log::debug!("rotate: applying EXIF orientation {}", o.to_exif());
                buf = Some(o.apply(buf.as_ref().unwrap_or(source)));
            }
        }
        Some(Rotation::Degrees(d)) if d.is_finite() && d.rem_euclid(360.0) != 0.0 => {
            log::debug!("rotate: {d} degrees");
            buf = Some(rotate_image(buf.as_ref().unwrap_or(source), d));
        }
        _ => {}
    }

    // 2. Crop
    if let Some(spec) = &params.crop {
        let img = buf.as_ref().unwrap_or(source);
        if let Some((x, y, w, h)) = crop_frame(img.width(), img.height(), spec) {
            log::debug!("crop: {w}x{h} at ({x}, {y})");
            buf = Some(img.sub_image(x, y, w, h));
        }
    }

    // 3. Resize
    let img = buf.as_ref().unwrap_or(source);
    if let Some(scale) = resize_scale(img.width(), img.height(), params.max_width, params.max_height, params.upscale) {
        let nw = uround(img.width() as f64 * scale).max(1);
        let nh = uround(img.height() as f64 * scale).max(1);
        if (nw, nh) != (img.width(), img.height()) {
            log::debug!("resize: {}x{} -> {nw}x{nh}", img.width(), img.height());
            buf = Some(resample(img, nw, nh));
        }
    }

    // 4. Watermark
    if let Some(spec) = &params.watermark {
        let target = buf.as_ref().unwrap_or(source);
        if spec.image.is_empty() || target.is_empty() || spec.opacity <= 0.0 {
            log::warn!("watermark image unusable, skipping");
        } else {
            let mut img = buf.take().unwrap_or_else(|| source.clone());
            apply_watermark(&mut img, spec);
            log::debug!("watermark applied");
            buf = Some(img);
        }
    }

    // 5. Format selection
    let modified = buf.is_some();
    let allowed: Vec<ImageFormat> = if params.formats.is_empty() {
        ImageFormat::ALL.to_vec()
    } else {
        params.formats.clone()
    }
    .into_iter()
    .filter(|&f| codec.can_write(f))
    .collect();

    let source_ok = params.source_format.map_or(true, |f| allowed.contains(&f));
    let buffer = buf.unwrap_or_else(|| source.clone());
    if !modified && !params.destination_differs && source_ok {
        log::debug!("format: nothing changed, passing through");
        return Ok(TransformOutcome {
            buffer,
            modified,
            output: Output::PassThrough,
        });
    }

    let format = params
        .source_format
        .filter(|f| allowed.contains(f))
        .or_else(|| allowed.first().copied())
        .ok_or_else(|| Error::UnsupportedFormat("no writable output format allowed".into()))?;
    log::debug!("format: encoding as {format}");
    let bytes = codec.encode(&buffer, format, params.quality, params.compression)?;
    Ok(TransformOutcome {
        buffer,
        modified,
        output: Output::Encoded { format, bytes },
    })
}

/// Transform `source` with the `image`-crate codec.
///
/// Returns the transformed buffer and `true`, or the untouched source and
/// `false` if any stage failed. The encoded bytes are dropped; callers that
/// need them (or the chosen format) use [`run_pipeline`].
pub fn transform_image(source: RasterBuffer, params: &TransformParams) -> (RasterBuffer, bool) {
    transform_image_with(&ImageCrateCodec, source, params)
}

pub fn transform_image_with<C: RasterCodec + ?Sized>(codec: &C, source: RasterBuffer, params: &TransformParams) -> (RasterBuffer, bool) {
    match run_pipeline(codec, &source, params) {
        Ok(outcome) => (outcome.buffer, true),
        Err(e) => {
            log::warn!("image transform failed: {e}");
            (source, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32) -> RasterBuffer {
        RasterBuffer::filled(w, h, Rgba8::new_opaque(200, 100, 50))
    }

    struct RefusingCodec;

    impl RasterCodec for RefusingCodec {
        fn decode(&self, _bytes: &[u8]) -> Result<(RasterBuffer, ImageFormat)> {
            Err(Error::Codec("no".into()))
        }
        fn encode(&self, _b: &RasterBuffer, _f: ImageFormat, _q: u8, _c: u8) -> Result<Vec<u8>> {
            Err(Error::Codec("no".into()))
        }
        fn can_write(&self, format: ImageFormat) -> bool {
            format == ImageFormat::Png
        }
    }

    #[test]
    fn test_noop_pipeline_passes_through() {
        let src = solid(40, 30);
        let params = TransformParams {
            max_width: Some(100),
            max_height: Some(100),
            source_format: Some(ImageFormat::Png),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&RefusingCodec, &src, &params).unwrap();
        assert!(!outcome.modified);
        assert_eq!(outcome.output, Output::PassThrough);
        assert_eq!(outcome.buffer, src);
        assert_eq!(transform_image(src.clone(), &params), (src, true));
    }

    #[test]
    fn test_resize_scale() {
        assert_eq!(resize_scale(400, 200, Some(100), Some(100), false), Some(0.25));
        assert_eq!(resize_scale(400, 200, None, Some(100), false), Some(0.5));
        assert_eq!(resize_scale(50, 50, Some(100), Some(100), false), None);
        assert_eq!(resize_scale(50, 50, Some(100), Some(200), true), Some(2.0));
        assert_eq!(resize_scale(50, 50, None, None, true), None);
    }

    #[test]
    fn test_resize_preserves_aspect() {
        let params = TransformParams {
            max_width: Some(50),
            max_height: Some(50),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&ImageCrateCodec, &solid(200, 100), &params).unwrap();
        assert!(outcome.modified);
        assert_eq!((outcome.buffer.width(), outcome.buffer.height()), (50, 25));
        assert_eq!(outcome.buffer.pixel(10, 10), Rgba8::new_opaque(200, 100, 50));
        assert!(matches!(outcome.output, Output::Encoded { format: ImageFormat::Png, .. }));
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("16:9"), Some(16.0 / 9.0));
        assert_eq!(parse_ratio("4/3"), Some(4.0 / 3.0));
        assert_eq!(parse_ratio(" 1.5 "), Some(1.5));
        assert_eq!(parse_ratio("wide"), None);
        assert_eq!(parse_ratio("1:0"), None);
        assert_eq!(parse_ratio("-2"), None);
    }

    #[test]
    fn test_autocrop_frame() {
        // Too wide: trim width, centered.
        assert_eq!(autocrop_frame(200, 100, 1.0, (0.5, 0.5)), (50, 0, 100, 100));
        assert_eq!(autocrop_frame(200, 100, 1.0, (1.0, 0.0)), (100, 0, 100, 100));
        // Too tall: trim height, top.
        assert_eq!(autocrop_frame(100, 300, 2.0, (0.5, 0.0)), (0, 0, 100, 50));
    }

    #[test]
    fn test_crop_frame_is_clamped() {
        let spec = CropSpec::Frame {
            x: 30,
            y: 10,
            width: 100,
            height: 100,
        };
        assert_eq!(crop_frame(40, 40, &spec), Some((30, 10, 10, 30)));
        let outside = CropSpec::Frame {
            x: 50,
            y: 0,
            width: 5,
            height: 5,
        };
        assert_eq!(crop_frame(40, 40, &outside), None);
        let bad = CropSpec::Auto {
            ratio: "nonsense".into(),
            offset: (0.5, 0.5),
        };
        assert_eq!(crop_frame(40, 40, &bad), None);
    }

    #[test]
    fn test_empty_source_with_auto_crop() {
        let src = RasterBuffer::new(0, 0);
        let auto = CropSpec::Auto {
            ratio: "1:1".into(),
            offset: (0.5, 0.5),
        };
        assert_eq!(crop_frame(0, 0, &auto), None);
        assert_eq!(crop_frame(0, 10, &auto), None);
        assert_eq!(autocrop_frame(0, 0, 1.0, (0.5, 0.5)), (0, 0, 0, 0));
        assert_eq!(autocrop_frame(0, 7, 2.0, (0.5, 0.5)), (0, 0, 0, 7));
        let params = TransformParams {
            crop: Some(auto),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&RefusingCodec, &src, &params).unwrap();
        assert!(!outcome.modified);
        assert_eq!(outcome.output, Output::PassThrough);
        assert_eq!(transform_image(src.clone(), &params), (src, true));
    }

    #[test]
    fn test_unusable_watermark_leaves_source_unmodified() {
        let src = solid(20, 20);
        let params = TransformParams {
            watermark: Some(WatermarkSpec {
                image: RasterBuffer::new(0, 0),
                size: 0.5,
                position: (0.5, 0.5),
                opacity: 1.0,
            }),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&RefusingCodec, &src, &params).unwrap();
        assert!(!outcome.modified);
        assert_eq!(outcome.buffer, src);
    }

    #[test]
    fn test_auto_rotation_from_exif() {
        let src = solid(4, 2);
        let params = TransformParams {
            rotate: Some(Rotation::Auto),
            exif_orientation: Some(6),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&ImageCrateCodec, &src, &params).unwrap();
        assert_eq!((outcome.buffer.width(), outcome.buffer.height()), (2, 4));

        let upright = TransformParams {
            exif_orientation: Some(1),
            ..params
        };
        let outcome = run_pipeline(&ImageCrateCodec, &src, &upright).unwrap();
        assert!(!outcome.modified);
    }

    #[test]
    fn test_arbitrary_rotation_expands_canvas() {
        let out = rotate_image(&solid(20, 20), 45.0);
        assert_eq!((out.width(), out.height()), (29, 29));
        assert!(out.pixel(0, 0).is_transparent());
        assert_eq!(out.pixel(14, 14), Rgba8::new_opaque(200, 100, 50));
    }

    #[test]
    fn test_watermark_placement() {
        // 100x60 target, mark 40x20, size 0.5 => longer side 30.
        assert_eq!(watermark_placement(100, 60, 40, 20, 0.5, (1.0, 1.0)), (70, 45, 30, 15));
        assert_eq!(watermark_placement(100, 60, 40, 20, 0.5, (0.0, 0.0)), (0, 0, 30, 15));
        assert_eq!(watermark_placement(100, 60, 40, 20, 0.5, (0.5, 0.5)), (35, 23, 30, 15));
    }

    #[test]
    fn test_watermark_blends_with_opacity() {
        let mut dst = RasterBuffer::filled(10, 10, Rgba8::new_opaque(0, 0, 0));
        let spec = WatermarkSpec {
            image: RasterBuffer::filled(2, 2, Rgba8::new_opaque(255, 255, 255)),
            size: 0.4,
            position: (0.0, 0.0),
            opacity: 0.5,
        };
        assert!(apply_watermark(&mut dst, &spec));
        let v = dst.pixel(1, 1).r;
        assert!((127..=129).contains(&v), "{v}");
        assert_eq!(dst.pixel(5, 5).r, 0);

        let empty = WatermarkSpec {
            image: RasterBuffer::new(0, 0),
            ..spec
        };
        assert!(!apply_watermark(&mut dst, &empty));
    }

    #[test]
    fn test_encode_failure_keeps_source() {
        let src = solid(8, 8);
        let params = TransformParams {
            rotate: Some(Rotation::Degrees(90.0)),
            ..TransformParams::default()
        };
        assert!(run_pipeline(&RefusingCodec, &src, &params).is_err());
        assert_eq!(transform_image_with(&RefusingCodec, src.clone(), &params), (src.clone(), false));
        let (buf, ok) = transform_image(src, &params);
        assert!(ok);
        assert_eq!(buf.width(), 8);
    }

    #[test]
    fn test_format_selection() {
        let src = solid(8, 8);
        let params = TransformParams {
            formats: vec![ImageFormat::Jpeg, ImageFormat::Png],
            source_format: Some(ImageFormat::Gif),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&ImageCrateCodec, &src, &params).unwrap();
        assert!(matches!(outcome.output, Output::Encoded { format: ImageFormat::Jpeg, .. }));

        let only_gif = TransformParams {
            formats: vec![ImageFormat::Gif],
            source_format: Some(ImageFormat::Gif),
            ..TransformParams::default()
        };
        let outcome = run_pipeline(&RefusingCodec, &src, &only_gif);
        assert!(matches!(outcome, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_resample_box_average() {
        let mut src = RasterBuffer::filled(4, 4, Rgba8::new_opaque(0, 0, 0));
        for y in 0..4 {
            for x in 0..2 {
                src.put(x, y, Rgba8::new_opaque(200, 0, 0));
            }
        }
        let out = resample(&src, 1, 1);
        assert_eq!(out.pixel(0, 0), Rgba8::new_opaque(100, 0, 0));
    }
}
