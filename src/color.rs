//! Color types and CSS-like color parsing.
//!
//! Two RGBA representations meet in this crate:
//! - [`Rgba8`]: straight (non-premultiplied) 8-bit RGBA, the pixel layout of
//!   [`RasterBuffer`](crate::rendering_buffer::RasterBuffer).
//! - [`ColorRgba`]: 8-bit RGB plus a 7-bit *transparency* channel in
//!   `0..=127` (0 = opaque, 127 = fully transparent), the alpha scale of the
//!   drawing API the challenge colors are specified in.
//!
//! Conversions between the two rescale alpha explicitly; the ranges are never
//! mixed implicitly.

use core::convert::Infallible;
use core::str::FromStr;

use crate::basics::{clamp_channel, uround};

/// Largest value of the 7-bit transparency channel.
pub const ALPHA_MAX: u8 = 127;

// ============================================================================
// Rgba8 (8-bit per channel, straight alpha)
// ============================================================================

/// RGBA color with u8 components, alpha 255 = opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_MASK: u32 = (1 << Self::BASE_SHIFT) - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Fixed-point multiply, exact over u8: `a * b / 255` rounded.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Interpolate channel `p` toward `q` by `a / 255`.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t: i32 = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    /// Interpolate between `self` and `c` by parameter `k` in `[0, 1]`.
    pub fn gradient(&self, c: &Rgba8, k: f64) -> Rgba8 {
        let mix = |a: u8, b: u8| clamp_channel(a as f64 + (b as f64 - a as f64) * k);
        Rgba8::new(
            mix(self.r, c.r),
            mix(self.g, c.g),
            mix(self.b, c.b),
            mix(self.a, c.a),
        )
    }
}

impl From<ColorRgba> for Rgba8 {
    fn from(c: ColorRgba) -> Self {
        let a = c.a.min(ALPHA_MAX) as u32;
        Rgba8::new(c.r, c.g, c.b, (255 - uround(a as f64 * 255.0 / ALPHA_MAX as f64)) as u8)
    }
}

// ============================================================================
// ColorRgba (7-bit transparency)
// ============================================================================

/// RGB color plus a transparency channel in `0..=127` (0 = opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    /// Fallback for unparseable color input: transparent black.
    pub const DEFAULT: ColorRgba = ColorRgba {
        r: 0,
        g: 0,
        b: 0,
        a: ALPHA_MAX,
    };

    /// Create a color; `a` is clamped to `0..=127`.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: a.min(ALPHA_MAX),
        }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0)
    }
}

impl Default for ColorRgba {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Rgba8> for ColorRgba {
    fn from(c: Rgba8) -> Self {
        let a = uround((255 - c.a) as f64 * ALPHA_MAX as f64 / 255.0) as u8;
        ColorRgba::new(c.r, c.g, c.b, a)
    }
}

impl FromStr for ColorRgba {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_color(s))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a CSS-like color string.
///
/// Accepted forms (case-insensitive, surrounding whitespace ignored):
/// `rgb(r, g, b)`, `rgba(r, g, b, a)` with `a` an opacity in `0.0..=1.0`,
/// `#RRGGBB`, `#RRGGBBAA`, `#RGB` and `#RGBA`. Hex alpha is an opacity byte.
///
/// Anything else yields [`ColorRgba::DEFAULT`]; this never fails.
pub fn parse_color(input: &str) -> ColorRgba {
    let s = input.trim().to_ascii_lowercase();
    let parsed = if let Some(hex) = s.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(args) = function_args(&s, "rgba") {
        parse_rgb_args(args, true)
    } else if let Some(args) = function_args(&s, "rgb") {
        parse_rgb_args(args, false)
    } else {
        None
    };
    parsed.unwrap_or_else(|| {
        log::warn!("unparseable color {input:?}, using default");
        ColorRgba::DEFAULT
    })
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_args(args: &str, with_alpha: bool) -> Option<ColorRgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        let v: f64 = part.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        *slot = clamp_channel(v);
    }
    let a = if with_alpha {
        let opacity: f64 = parts[3].parse().ok()?;
        if !opacity.is_finite() {
            return None;
        }
        opacity_to_alpha(opacity)
    } else {
        0
    };
    Some(ColorRgba::new(rgb[0], rgb[1], rgb[2], a))
}

fn parse_hex(hex: &str) -> Option<ColorRgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digits: Vec<u8> = match hex.len() {
        3 | 4 => hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
            .collect::<Option<_>>()?,
        6 | 8 => (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let a = digits
        .get(3)
        .map(|&opacity| opacity_to_alpha(opacity as f64 / 255.0))
        .unwrap_or(0);
    Some(ColorRgba::new(digits[0], digits[1], digits[2], a))
}

/// Map an opacity in `[0, 1]` onto the 7-bit transparency scale.
fn opacity_to_alpha(opacity: f64) -> u8 {
    uround((1.0 - opacity.clamp(0.0, 1.0)) * ALPHA_MAX as f64) as u8
}
