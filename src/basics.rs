//! Foundation numeric helpers shared by the color, geometry and raster layers.
//!
//! Rounding follows the "half away from zero" convention everywhere so that
//! gradient tables, projected pixel indices and converted color channels
//! agree with each other.

pub const PI: f64 = std::f64::consts::PI;

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer, half away from zero.
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round a non-negative value to the nearest unsigned integer (half up).
/// Negative input saturates to 0.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Floor toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Round and clamp into a `u8` channel.
#[inline]
pub fn clamp_channel(v: f64) -> u8 {
    if v <= 0.0 {
        0
    } else if v >= 255.0 {
        255
    } else {
        uround(v) as u8
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees.
#[inline]
pub fn rad2deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Compare two floats with an absolute epsilon.
#[inline]
pub fn is_equal_eps(v1: f64, v2: f64, epsilon: f64) -> bool {
    (v1 - v2).abs() <= epsilon
}
