//! Geometry primitives: points, vectors, bounding boxes and polygons.
//!
//! All coordinates are screen coordinates (y grows downward). Every function
//! here is pure and deterministic.
//!
//! Angles in polar form follow the math convention mirrored onto the screen:
//! a vector pointing right has angle 0, a vector pointing *up* has angle
//! `+π/2`. The unit direction of angle `α` is therefore `(cos α, −sin α)`,
//! which is what [`rotate_point`] and the gradient projection rely on.

use core::ops::{Add, Sub};

use crate::basics::{deg2rad, PI};

// ============================================================================
// Point
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ============================================================================
// Vector and polar form
// ============================================================================

/// A directed segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub start: Point,
    pub end: Point,
}

/// Polar decomposition of a [`Vector`]: origin, angle in radians, length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub start: Point,
    pub angle: f64,
    pub length: f64,
}

impl Vector {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn to_polar(&self) -> Polar {
        vector_to_polar(self)
    }
}

impl Polar {
    pub fn to_vector(&self) -> Vector {
        let end = Point::new(
            self.start.x + self.length * self.angle.cos(),
            self.start.y - self.length * self.angle.sin(),
        );
        Vector::new(self.start, end)
    }
}

/// Decompose a vector into polar form.
///
/// The angle comes from `asin` when the horizontal delta dominates and from
/// `acos` otherwise, so the inverse trig call always works away from its
/// flat (ill-conditioned) end. Result lies in `(−π, π]`; a zero-length
/// vector has angle 0.
pub fn vector_to_polar(v: &Vector) -> Polar {
    let dx = v.end.x - v.start.x;
    let dy = v.end.y - v.start.y;
    let length = dx.hypot(dy);
    if length == 0.0 || !length.is_finite() {
        return Polar {
            start: v.start,
            angle: 0.0,
            length: if length.is_finite() { length } else { 0.0 },
        };
    }
    let cos_a = (dx / length).clamp(-1.0, 1.0);
    let sin_a = (-dy / length).clamp(-1.0, 1.0);
    let mut angle = if dx.abs() >= dy.abs() {
        let a = sin_a.asin();
        if cos_a < 0.0 {
            PI - a
        } else {
            a
        }
    } else {
        let a = cos_a.acos();
        if sin_a < 0.0 {
            -a
        } else {
            a
        }
    };
    if angle > PI {
        angle -= 2.0 * PI;
    }
    Polar {
        start: v.start,
        angle,
        length,
    }
}

// ============================================================================
// BoundingBox
// ============================================================================

/// Axis-aligned box given by its left-top and right-bottom corners.
/// Construction normalizes so that `rb >= lt` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lt: Point,
    pub rb: Point,
}

impl BoundingBox {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            lt: Point::new(a.x.min(b.x), a.y.min(b.y)),
            rb: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(Point::new(x, y), Point::new(x + w, y + h))
    }

    pub fn width(&self) -> f64 {
        self.rb.x - self.lt.x
    }

    pub fn height(&self) -> f64 {
        self.rb.y - self.lt.y
    }

    pub fn center(&self) -> Point {
        bbox_center(self)
    }

    /// The four corners, clockwise from the left-top one.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.lt,
            Point::new(self.rb.x, self.lt.y),
            self.rb,
            Point::new(self.lt.x, self.rb.y),
        ]
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.lt.x && p.x <= self.rb.x && p.y >= self.lt.y && p.y <= self.rb.y
    }

    /// Shrink `self` so it lies within `bounds`. Disjoint boxes collapse to a
    /// zero-area box on the nearest edge of `bounds`.
    pub fn clamp_to(&self, bounds: &BoundingBox) -> BoundingBox {
        let clamp = |p: Point| {
            Point::new(
                p.x.clamp(bounds.lt.x, bounds.rb.x),
                p.y.clamp(bounds.lt.y, bounds.rb.y),
            )
        };
        BoundingBox::new(clamp(self.lt), clamp(self.rb))
    }

    /// Shrink by `dx`/`dy` on each side, never past the center.
    pub fn inset(&self, dx: f64, dy: f64) -> BoundingBox {
        let dx = dx.min(self.width() / 2.0);
        let dy = dy.min(self.height() / 2.0);
        BoundingBox::new(self.lt.translate(dx, dy), self.rb.translate(-dx, -dy))
    }
}

pub fn bbox_center(b: &BoundingBox) -> Point {
    Point::new((b.lt.x + b.rb.x) / 2.0, (b.lt.y + b.rb.y) / 2.0)
}

// ============================================================================
// Point and polygon transforms
// ============================================================================

/// Rotate `p` about `center` by `angle_deg` degrees:
/// `x' = cx + dx·cosθ + dy·sinθ`, `y' = cy − dx·sinθ + dy·cosθ`.
pub fn rotate_point(p: &Point, angle_deg: f64, center: &Point) -> Point {
    if angle_deg == 0.0 {
        return *p;
    }
    let (sin_t, cos_t) = deg2rad(angle_deg).sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(
        center.x + dx * cos_t + dy * sin_t,
        center.y - dx * sin_t + dy * cos_t,
    )
}

/// Scale the offset of `p` from `center` by `k`.
pub fn scale_point(p: &Point, k: f64, center: &Point) -> Point {
    Point::new(
        center.x + (p.x - center.x) * k,
        center.y + (p.y - center.y) * k,
    )
}

/// Arithmetic mean of the vertices; the origin for an empty polygon.
pub fn polygon_centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let n = points.len() as f64;
    let sum = points.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
    Point::new(sum.x / n, sum.y / n)
}

/// Smallest axis-aligned box containing every vertex.
pub fn polygon_bounds(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (lt, rb) = points.iter().fold((*first, *first), |(lt, rb), p| {
        (
            Point::new(lt.x.min(p.x), lt.y.min(p.y)),
            Point::new(rb.x.max(p.x), rb.y.max(p.y)),
        )
    });
    Some(BoundingBox { lt, rb })
}

/// Rotate every vertex about `center`, or about the centroid when `None`.
pub fn rotate_polygon(points: &[Point], angle_deg: f64, center: Option<Point>) -> Vec<Point> {
    let c = center.unwrap_or_else(|| polygon_centroid(points));
    points.iter().map(|p| rotate_point(p, angle_deg, &c)).collect()
}

/// Scale every vertex about `center`, or about the centroid when `None`.
pub fn scale_polygon(points: &[Point], k: f64, center: Option<Point>) -> Vec<Point> {
    let c = center.unwrap_or_else(|| polygon_centroid(points));
    points.iter().map(|p| scale_point(p, k, &c)).collect()
}

/// Twice the signed area (positive for clockwise winding on screen).
pub fn signed_area2(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}
