//! HSV color model: conversions, random colors and contrast helpers.
//!
//! Hue is parameterized by a configurable maximum (360 by default) so that
//! callers working in other angular units can reuse the same sextant math.
//! Saturation, value and the optional alpha are percentages in `0..=100`.

use rand::Rng;

use crate::basics::{clamp_channel, uround};
use crate::color::{ColorRgba, ALPHA_MAX};

/// Default hue range.
pub const HUE_MAX: f64 = 360.0;
/// Default alpha range of [`ColorHsv::a`].
pub const HSV_ALPHA_MAX: f64 = 100.0;

/// A color in HSV space.
///
/// `a` follows the transparency convention of [`ColorRgba`]: 0 is opaque,
/// `alpha_max` fully transparent. `None` means opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorHsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
    pub a: Option<f64>,
}

impl ColorHsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v, a: None }
    }

    pub fn with_alpha(h: f64, s: f64, v: f64, a: f64) -> Self {
        Self { h, s, v, a: Some(a) }
    }

    /// Wrap hue into `[0, hue_max)` and clamp the percentage channels.
    ///
    /// [`deviated_hsv`] deliberately leaves channels unclamped; call this
    /// before converting a walked color.
    pub fn clamped(&self, hue_max: f64) -> Self {
        Self {
            h: self.h.rem_euclid(hue_max),
            s: self.s.clamp(0.0, 100.0),
            v: self.v.clamp(0.0, 100.0),
            a: self.a.map(|a| a.clamp(0.0, HSV_ALPHA_MAX)),
        }
    }
}

/// Per-channel overrides for [`random_hsv`]. `None` draws the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HsvOverrides {
    pub h: Option<f64>,
    pub s: Option<f64>,
    pub v: Option<f64>,
    pub a: Option<f64>,
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert HSV to RGB with the default ranges (hue 360, alpha 100).
pub fn hsv_to_rgb(hsv: &ColorHsv) -> ColorRgba {
    hsv_to_rgb_ranged(hsv, HUE_MAX, HSV_ALPHA_MAX)
}

/// Convert HSV to RGB using six sextants of `hue_max / 6` each.
///
/// Alpha is rescaled linearly from `alpha_max` to the 7-bit transparency
/// range when present; absent alpha yields an opaque color.
pub fn hsv_to_rgb_ranged(hsv: &ColorHsv, hue_max: f64, alpha_max: f64) -> ColorRgba {
    let s = (hsv.s / 100.0).clamp(0.0, 1.0);
    let v = (hsv.v / 100.0).clamp(0.0, 1.0);
    let sextant_width = hue_max / 6.0;
    let h = hsv.h.rem_euclid(hue_max) / sextant_width;
    let sextant = (h.floor() as i32).clamp(0, 5);
    let f = h - sextant as f64;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sextant {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    let a = match hsv.a {
        Some(a) if alpha_max > 0.0 => {
            uround(a.clamp(0.0, alpha_max) * ALPHA_MAX as f64 / alpha_max) as u8
        }
        _ => 0,
    };
    ColorRgba::new(
        clamp_channel(r * 255.0),
        clamp_channel(g * 255.0),
        clamp_channel(b * 255.0),
        a,
    )
}

/// Convert RGB to HSV with the default hue range.
///
/// Alpha is carried over, rescaled to `0..=100`.
pub fn rgb_to_hsv(c: &ColorRgba) -> ColorHsv {
    rgb_to_hsv_ranged(c, HUE_MAX)
}

pub fn rgb_to_hsv_ranged(c: &ColorRgba, hue_max: f64) -> ColorHsv {
    let r = c.r as f64 / 255.0;
    let g = c.g as f64 / 255.0;
    let b = c.b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let sextant_width = hue_max / 6.0;
    let h = if delta <= 0.0 {
        0.0
    } else if max == r {
        sextant_width * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        sextant_width * ((b - r) / delta + 2.0)
    } else {
        sextant_width * ((r - g) / delta + 4.0)
    };
    let s = if max <= 0.0 { 0.0 } else { delta / max };

    ColorHsv {
        h,
        s: s * 100.0,
        v: max * 100.0,
        a: Some(c.a as f64 * HSV_ALPHA_MAX / ALPHA_MAX as f64),
    }
}

// ============================================================================
// Random and derived colors
// ============================================================================

/// Draw a random color: h in `[0, 360)`, s in `[50, 100]`, v and a in
/// `[0, 100]`, each unless overridden.
pub fn random_hsv<R: Rng + ?Sized>(rng: &mut R, overrides: HsvOverrides) -> ColorHsv {
    ColorHsv {
        h: overrides.h.unwrap_or_else(|| rng.gen_range(0.0..HUE_MAX)),
        s: overrides.s.unwrap_or_else(|| rng.gen_range(50.0..=100.0)),
        v: overrides.v.unwrap_or_else(|| rng.gen_range(0.0..=100.0)),
        a: Some(overrides.a.unwrap_or_else(|| rng.gen_range(0.0..=HSV_ALPHA_MAX))),
    }
}

/// Offset every channel by an independent uniform draw from
/// `[-deviation, deviation]`. No clamping; see [`ColorHsv::clamped`].
pub fn deviated_hsv<R: Rng + ?Sized>(rng: &mut R, base: &ColorHsv, deviation: f64) -> ColorHsv {
    let deviation = deviation.abs();
    if deviation == 0.0 || !deviation.is_finite() {
        return *base;
    }
    let mut jitter = |v: f64| v + rng.gen_range(-deviation..=deviation);
    ColorHsv {
        h: jitter(base.h),
        s: jitter(base.s),
        v: jitter(base.v),
        a: base.a.map(&mut jitter),
    }
}

/// A contrasting color: hue rotated half a turn, value swung 50 points into
/// the opposite half of `[0, 100]`. Saturation and alpha are kept.
pub fn complementary_hsv(hsv: &ColorHsv, hue_max: f64) -> ColorHsv {
    let v = if hsv.v >= 50.0 { hsv.v - 50.0 } else { hsv.v + 50.0 };
    ColorHsv {
        h: (hsv.h + hue_max / 2.0).rem_euclid(hue_max),
        s: hsv.s,
        v,
        a: hsv.a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hue_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(HUE_MAX);
        d.min(HUE_MAX - d)
    }

    #[test]
    fn test_hsv_to_rgb_primaries() {
        assert_eq!(hsv_to_rgb(&ColorHsv::new(0.0, 100.0, 100.0)), ColorRgba::opaque(255, 0, 0));
        assert_eq!(hsv_to_rgb(&ColorHsv::new(120.0, 100.0, 100.0)), ColorRgba::opaque(0, 255, 0));
        assert_eq!(hsv_to_rgb(&ColorHsv::new(240.0, 100.0, 100.0)), ColorRgba::opaque(0, 0, 255));
        assert_eq!(hsv_to_rgb(&ColorHsv::new(360.0, 100.0, 100.0)), ColorRgba::opaque(255, 0, 0));
        assert_eq!(hsv_to_rgb(&ColorHsv::new(42.0, 0.0, 0.0)), ColorRgba::opaque(0, 0, 0));
    }

    #[test]
    fn test_hsv_to_rgb_custom_hue_range() {
        // Hue in [0, 1): a third of a turn is green.
        let c = hsv_to_rgb_ranged(&ColorHsv::new(1.0 / 3.0, 100.0, 100.0), 1.0, 100.0);
        assert_eq!((c.r, c.g, c.b), (0, 255, 0));
    }

    #[test]
    fn test_hsv_alpha_rescaled() {
        let c = hsv_to_rgb(&ColorHsv::with_alpha(0.0, 100.0, 100.0, 100.0));
        assert_eq!(c.a, 127);
        let c = hsv_to_rgb(&ColorHsv::with_alpha(0.0, 100.0, 100.0, 50.0));
        assert_eq!(c.a, 64);
        let c = hsv_to_rgb_ranged(&ColorHsv::with_alpha(0.0, 100.0, 100.0, 1.0), HUE_MAX, 1.0);
        assert_eq!(c.a, 127);
    }

    #[test]
    fn test_rgb_to_hsv_roundtrip_primary() {
        let hsv = rgb_to_hsv(&ColorRgba::opaque(0, 0, 255));
        assert!((hsv.h - 240.0).abs() < 1e-9);
        assert!((hsv.s - 100.0).abs() < 1e-9);
        assert!((hsv.v - 100.0).abs() < 1e-9);
        assert_eq!(hsv.a, Some(0.0));
    }

    #[test]
    fn test_random_hsv_ranges_and_overrides() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let c = random_hsv(&mut rng, HsvOverrides::default());
            assert!((0.0..360.0).contains(&c.h));
            assert!((50.0..=100.0).contains(&c.s));
            assert!((0.0..=100.0).contains(&c.v));
            assert!(c.a.map_or(false, |a| (0.0..=100.0).contains(&a)));
        }
        let fixed = random_hsv(
            &mut rng,
            HsvOverrides {
                h: Some(12.0),
                v: Some(3.0),
                ..Default::default()
            },
        );
        assert_eq!(fixed.h, 12.0);
        assert_eq!(fixed.v, 3.0);
    }

    #[test]
    fn test_deviated_hsv_zero_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let base = ColorHsv::with_alpha(10.0, 20.0, 30.0, 40.0);
        assert_eq!(deviated_hsv(&mut rng, &base, 0.0), base);
    }

    #[test]
    fn test_deviated_hsv_within_bounds_and_unclamped() {
        let mut rng = StdRng::seed_from_u64(2);
        let base = ColorHsv::with_alpha(0.0, 100.0, 0.0, 0.0);
        let mut saw_out_of_range = false;
        for _ in 0..200 {
            let d = deviated_hsv(&mut rng, &base, 10.0);
            assert!((d.h - base.h).abs() <= 10.0);
            assert!((d.s - base.s).abs() <= 10.0);
            assert!((d.v - base.v).abs() <= 10.0);
            saw_out_of_range |= d.h < 0.0 || d.s > 100.0 || d.v < 0.0;
        }
        assert!(saw_out_of_range);
    }

    #[test]
    fn test_complementary_hsv() {
        let c = complementary_hsv(&ColorHsv::with_alpha(300.0, 70.0, 80.0, 5.0), HUE_MAX);
        assert_eq!(c.h, 120.0);
        assert_eq!(c.s, 70.0);
        assert_eq!(c.v, 30.0);
        assert_eq!(c.a, Some(5.0));
        let dark = complementary_hsv(&ColorHsv::new(10.0, 50.0, 20.0), HUE_MAX);
        assert_eq!(dark.v, 70.0);
    }

    #[test]
    fn test_double_complement_through_rgb_restores_hue() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..300 {
            let original = ColorHsv::new(
                rng.gen_range(0.0..360.0),
                rng.gen_range(60.0..=100.0),
                rng.gen_range(30.0..=45.0),
            );
            let c = hsv_to_rgb(&original);
            let once = hsv_to_rgb(&complementary_hsv(&rgb_to_hsv(&c), HUE_MAX));
            let twice = hsv_to_rgb(&complementary_hsv(&rgb_to_hsv(&once), HUE_MAX));
            let back = rgb_to_hsv(&twice);
            assert!(
                hue_distance(back.h, original.h) < 3.0,
                "hue {} drifted to {}",
                original.h,
                back.h
            );
        }
    }

    #[test]
    fn test_clamped_wraps_hue() {
        let c = ColorHsv::with_alpha(-30.0, 120.0, -5.0, 130.0).clamped(HUE_MAX);
        assert_eq!(c.h, 330.0);
        assert_eq!(c.s, 100.0);
        assert_eq!(c.v, 0.0);
        assert_eq!(c.a, Some(100.0));
    }
}
