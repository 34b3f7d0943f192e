//! Path storage: move/line/curve commands and their flattening.
//!
//! A [`Path`] records drawing commands (as produced by glyph outlines and the
//! debris figure generators) and flattens them into closed or open polylines
//! for the rasterizer. Bezier curves use incremental subdivision with a step
//! count proportional to the control polygon length.

use crate::basics::uround;
use crate::geometry::{polygon_bounds, BoundingBox, Point};

const CURVE_MIN_STEPS: u32 = 4;
const CURVE_MAX_STEPS: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic Bezier: control point, end point.
    Curve3(Point, Point),
    /// Cubic Bezier: two control points, end point.
    Curve4(Point, Point, Point),
    Close,
}

/// A flattened sub-path.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// A closed polygon through `points`.
    pub fn from_polygon(points: &[Point]) -> Self {
        let mut path = Self::new();
        path.add_polygon(points, true);
        path
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
    }

    pub fn curve3(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.commands.push(PathCommand::Curve3(
            Point::new(x_ctrl, y_ctrl),
            Point::new(x_to, y_to),
        ));
    }

    pub fn curve4(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.commands.push(PathCommand::Curve4(ctrl1, ctrl2, to));
    }

    pub fn close_polygon(&mut self) {
        if !matches!(self.commands.last(), None | Some(PathCommand::Close)) {
            self.commands.push(PathCommand::Close);
        }
    }

    /// Append a polyline as a new sub-path.
    pub fn add_polygon(&mut self, points: &[Point], closed: bool) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        if closed {
            self.close_polygon();
        }
    }

    /// Apply `trans` to every stored point.
    pub fn transform<F: Fn(Point) -> Point>(&mut self, trans: &F) {
        for cmd in &mut self.commands {
            *cmd = match *cmd {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(trans(p)),
                PathCommand::LineTo(p) => PathCommand::LineTo(trans(p)),
                PathCommand::Curve3(c, p) => PathCommand::Curve3(trans(c), trans(p)),
                PathCommand::Curve4(c1, c2, p) => {
                    PathCommand::Curve4(trans(c1), trans(c2), trans(p))
                }
                PathCommand::Close => PathCommand::Close,
            };
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(&|p: Point| p.translate(dx, dy));
    }

    /// Flatten into polylines. Curves are subdivided; sub-paths with fewer
    /// than two points are dropped.
    pub fn flatten(&self) -> Vec<Contour> {
        let mut contours = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    flush_contour(&mut current, false, &mut contours);
                    current.push(p);
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::Curve3(c, p) => {
                    let from = current.last().copied().unwrap_or(c);
                    flatten_curve3(from, c, p, &mut current);
                }
                PathCommand::Curve4(c1, c2, p) => {
                    let from = current.last().copied().unwrap_or(c1);
                    flatten_curve4(from, c1, c2, p, &mut current);
                }
                PathCommand::Close => flush_contour(&mut current, true, &mut contours),
            }
        }
        flush_contour(&mut current, false, &mut contours);
        contours
    }

    /// Bounds of the flattened geometry.
    pub fn bounding_rect(&self) -> Option<BoundingBox> {
        let all: Vec<Point> = self
            .flatten()
            .into_iter()
            .flat_map(|c| c.points)
            .collect();
        polygon_bounds(&all)
    }
}

fn flush_contour(points: &mut Vec<Point>, closed: bool, out: &mut Vec<Contour>) {
    if points.len() >= 2 {
        out.push(Contour {
            points: core::mem::take(points),
            closed,
        });
    } else {
        points.clear();
    }
}

fn curve_steps(control_len: f64) -> u32 {
    uround(control_len * 0.25).clamp(CURVE_MIN_STEPS, CURVE_MAX_STEPS)
}

fn flatten_curve3(p1: Point, p2: Point, p3: Point, out: &mut Vec<Point>) {
    let steps = curve_steps(p1.distance(&p2) + p2.distance(&p3));
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let mt = 1.0 - t;
        let a = mt * mt;
        let b = 2.0 * mt * t;
        let c = t * t;
        out.push(Point::new(
            a * p1.x + b * p2.x + c * p3.x,
            a * p1.y + b * p2.y + c * p3.y,
        ));
    }
}

fn flatten_curve4(p1: Point, p2: Point, p3: Point, p4: Point, out: &mut Vec<Point>) {
    let steps = curve_steps(p1.distance(&p2) + p2.distance(&p3) + p3.distance(&p4));
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        out.push(Point::new(
            a * p1.x + b * p2.x + c * p3.x + d * p4.x,
            a * p1.y + b * p2.y + c * p3.y + d * p4.y,
        ));
    }
}
