//! Multi-stop linear gradients along an arbitrary vector.
//!
//! Rendering is table driven: the color ramp is computed once per gradient
//! as a 1-D table of `length` entries, then every pixel of the target box is
//! projected onto the gradient axis and looked up. The trig happens once per
//! gradient, not per pixel.

use crate::basics::{clamp_channel, iround, PI};
use crate::color::{ColorRgba, Rgba8};
use crate::geometry::{BoundingBox, Point, Vector};
use crate::pixfmt_rgba::Raster;

/// A color stop at `pos` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientNode {
    pub pos: f64,
    pub color: ColorRgba,
}

impl GradientNode {
    pub fn new(pos: f64, color: ColorRgba) -> Self {
        Self { pos, color }
    }
}

/// Interpolation kernel between two stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// `0.5 − 0.5·cos(π·t)`: flat at both ends, steep in the middle.
    #[default]
    Cosine,
    Linear,
}

impl Interpolation {
    #[inline]
    pub fn weight(self, t: f64) -> f64 {
        match self {
            Interpolation::Cosine => 0.5 - 0.5 * (PI * t).cos(),
            Interpolation::Linear => t,
        }
    }
}

/// Sort stops, clamp positions into `[0, 1]` and pin the first stop to 0
/// and the last to 1.
pub fn normalize_nodes(nodes: &[GradientNode]) -> Vec<GradientNode> {
    let mut out: Vec<GradientNode> = nodes
        .iter()
        .filter(|n| n.pos.is_finite())
        .map(|n| GradientNode::new(n.pos.clamp(0.0, 1.0), n.color))
        .collect();
    out.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    if let Some(first) = out.first_mut() {
        first.pos = 0.0;
    }
    if let Some(last) = out.last_mut() {
        last.pos = 1.0;
    }
    out
}

fn mix(a: &ColorRgba, b: &ColorRgba, w: f64) -> ColorRgba {
    let ch = |x: u8, y: u8| clamp_channel(x as f64 + (y as f64 - x as f64) * w);
    ColorRgba::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b), ch(a.a, b.a))
}

/// Build the color table of a gradient with `length` entries.
///
/// Entry 0 is the first stop's color and entry `length − 1` the last stop's.
/// Between consecutive stops each entry is interpolated with `interpolation`.
/// Stops are expected in ascending order from 0 to 1.
pub fn generate_gradient_colors(
    nodes: &[GradientNode],
    length: usize,
    interpolation: Interpolation,
) -> Vec<ColorRgba> {
    if length == 0 {
        return Vec::new();
    }
    let (first, last) = match (nodes.first(), nodes.last()) {
        (Some(f), Some(l)) => (f.color, l.color),
        _ => return vec![ColorRgba::DEFAULT; length],
    };

    let span = (length - 1) as f64;
    let mut colors = vec![first; length];
    let index = |pos: f64| (iround(pos.clamp(0.0, 1.0) * span).max(0) as usize).min(length - 1);

    let mut covered_to = 0usize;
    for pair in nodes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let start = index(a.pos);
        let end = index(b.pos);
        if end <= start {
            continue;
        }
        let seg = (end - start) as f64;
        for (l, slot) in colors.iter_mut().enumerate().take(end).skip(start) {
            let t = (l - start) as f64 / seg;
            *slot = mix(&a.color, &b.color, interpolation.weight(t));
        }
        covered_to = covered_to.max(end);
    }
    for slot in &mut colors[covered_to..] {
        *slot = last;
    }
    // Collapsed leading segments must not shift the first color.
    colors[0] = if length == 1 { last } else { first };
    colors
}

// ============================================================================
// Gradient axis
// ============================================================================

/// The projection of a gradient vector: rounded start, unit direction and
/// table length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientAxis {
    start: Point,
    cos_a: f64,
    sin_a: f64,
    length: usize,
    angle: f64,
}

impl GradientAxis {
    pub fn new(vector: &Vector) -> Self {
        let polar = vector.to_polar();
        let (sin_a, cos_a) = polar.angle.sin_cos();
        Self {
            start: Point::new(iround(polar.start.x) as f64, iround(polar.start.y) as f64),
            cos_a,
            sin_a,
            length: iround(polar.length).max(1) as usize,
            angle: polar.angle,
        }
    }

    /// Number of entries in the color table.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Table index of `(x, y)`:
    /// `round(dx·cosα − dy·sinα)` clamped to `[0, length − 1]`, with
    /// `(dx, dy)` the offset from the rounded start.
    #[inline]
    pub fn index(&self, x: f64, y: f64) -> usize {
        let dx = x - self.start.x;
        let dy = y - self.start.y;
        iround(dx * self.cos_a - dy * self.sin_a).clamp(0, self.length as i32 - 1) as usize
    }
}

/// Paint `bbox` (clipped to `ren`) with a gradient running along `vector`.
///
/// Pixels before the vector's start take the first color, pixels past its
/// end the last; see [`GradientAxis::index`].
pub fn render_gradient<R: Raster + ?Sized>(
    ren: &mut R,
    bbox: &BoundingBox,
    vector: &Vector,
    nodes: &[GradientNode],
    interpolation: Interpolation,
) {
    let axis = GradientAxis::new(vector);
    let table: Vec<Rgba8> = generate_gradient_colors(nodes, axis.length(), interpolation)
        .into_iter()
        .map(Rgba8::from)
        .collect();

    let x0 = bbox.lt.x.floor().max(0.0) as i32;
    let y0 = bbox.lt.y.floor().max(0.0) as i32;
    let x1 = (bbox.rb.x.ceil() as i64).min(ren.width() as i64) as i32;
    let y1 = (bbox.rb.y.ceil() as i64).min(ren.height() as i64) as i32;

    for y in y0..y1 {
        for x in x0..x1 {
            ren.copy_pixel(x, y, &table[axis.index(x as f64, y as f64)]);
        }
    }
    log::trace!(
        "gradient: {} stops, length {}, angle {:.3} rad over {}x{}",
        nodes.len(),
        axis.length(),
        axis.angle(),
        (x1 - x0).max(0),
        (y1 - y0).max(0)
    );
}
