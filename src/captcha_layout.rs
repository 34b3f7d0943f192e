//! CAPTCHA grid planning.
//!
//! The canvas is split into `rows × (n + extra)` cells where `n` is the
//! challenge length and `extra` is 1 or 2. Each column hosts at most one
//! glyph, so exactly `extra` columns carry no glyph at all. Column widths
//! and row heights are jittered and laid out cumulatively so cells never
//! overlap and never leave the content box. The planner also decides the
//! background gradient and records the background color under each cell,
//! which the renderer needs to pick contrasting glyph colors.

use rand::Rng;

use crate::color::ColorRgba;
use crate::color_hsv::{deviated_hsv, hsv_to_rgb, random_hsv, ColorHsv, HsvOverrides, HUE_MAX};
use crate::geometry::{BoundingBox, Point, Vector};
use crate::gradient::{
    generate_gradient_colors, normalize_nodes, GradientAxis, GradientNode, Interpolation,
};

/// Column width jitter, as a fraction of the nominal width.
pub const COLUMN_JITTER: f64 = 0.3;
/// Row height jitter, as a fraction of the nominal height.
pub const ROW_JITTER: f64 = 0.1;
/// Per-step channel deviation of the background color walk.
pub const BACKGROUND_DEVIATION: f64 = 25.0;
/// Jitter of background gradient stop positions.
pub const NODE_JITTER: f64 = 0.1;

/// Decorative shapes drawn into cells without a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoyKind {
    Triangle,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    /// The `index`-th character of the challenge.
    Glyph { ch: char, index: usize },
    Decoy(DecoyKind),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub bbox: BoundingBox,
    pub row: usize,
    pub col: usize,
    pub role: CellRole,
    /// Background color under the cell center, when known.
    pub background: Option<ColorRgba>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptchaLayout {
    pub width: u32,
    pub height: u32,
    pub rows: usize,
    pub cols: usize,
    pub content: BoundingBox,
    /// Row-major.
    pub cells: Vec<Cell>,
    pub vector: Vector,
    pub nodes: Vec<GradientNode>,
    pub interpolation: Interpolation,
}

impl CaptchaLayout {
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Glyph cells in challenge order.
    pub fn glyph_cells(&self) -> impl Iterator<Item = &Cell> {
        let mut glyphs: Vec<(usize, &Cell)> = self
            .cells
            .iter()
            .filter_map(|c| match c.role {
                CellRole::Glyph { index, .. } => Some((index, c)),
                _ => None,
            })
            .collect();
        glyphs.sort_by_key(|&(index, _)| index);
        glyphs.into_iter().map(|(_, c)| c)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub rows: usize,
    /// Margin on each side, as a fraction of the canvas dimension.
    pub padding: f64,
    pub interpolation: Interpolation,
    /// Start of the background color walk; random when `None`.
    pub seed_color: Option<ColorHsv>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            rows: 3,
            padding: 0.1,
            interpolation: Interpolation::Cosine,
            seed_color: None,
        }
    }
}

/// Split `total` into `count` jittered sizes that add up to `total`.
fn jittered_sizes<R: Rng + ?Sized>(rng: &mut R, total: f64, count: usize, jitter: f64) -> Vec<f64> {
    let nominal = total / count as f64;
    let raw: Vec<f64> = (0..count)
        .map(|_| nominal * (1.0 + rng.gen_range(-jitter..=jitter)))
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        return vec![nominal; count];
    }
    raw.into_iter().map(|s| s * total / sum).collect()
}

/// Pick which columns host a glyph: exactly `glyphs` of `cols` columns,
/// uniformly, left to right.
fn glyph_columns<R: Rng + ?Sized>(rng: &mut R, cols: usize, glyphs: usize) -> Vec<bool> {
    let mut remaining = glyphs.min(cols);
    (0..cols)
        .map(|c| {
            let left = cols - c;
            let host = remaining > 0 && (remaining == left || rng.gen_range(0..left) < remaining);
            if host {
                remaining -= 1;
            }
            host
        })
        .collect()
}

/// Background stops: `seed` at position 0 followed by a random walk of
/// `steps` colors, each deviating from the previous one. Step `i` sits near
/// `i / steps`; the last one is pinned to 1.
pub fn background_nodes<R: Rng + ?Sized>(rng: &mut R, seed: &ColorHsv, steps: usize) -> Vec<GradientNode> {
    let steps = steps.max(1);
    let mut nodes = Vec::with_capacity(steps + 1);
    nodes.push(GradientNode::new(0.0, hsv_to_rgb(&seed.clamped(HUE_MAX))));
    let mut current = *seed;
    for i in 1..=steps {
        current = deviated_hsv(rng, &current, BACKGROUND_DEVIATION);
        let pos = i as f64 / steps as f64 * (1.0 + rng.gen_range(-NODE_JITTER..=NODE_JITTER));
        nodes.push(GradientNode::new(pos, hsv_to_rgb(&current.clamped(HUE_MAX))));
    }
    normalize_nodes(&nodes)
}

/// A vector from the canvas' top-left quadrant to its bottom-right one.
pub fn background_vector<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Vector {
    let (w, h) = (width.max(2) as f64, height.max(2) as f64);
    let start = Point::new(rng.gen_range(0.0..w / 2.0), rng.gen_range(0.0..h / 2.0));
    let end = Point::new(rng.gen_range(w / 2.0..w), rng.gen_range(h / 2.0..h));
    Vector::new(start, end)
}

/// Plan the grid for `challenge` on a `width × height` canvas.
pub fn plan_layout<R: Rng + ?Sized>(
    rng: &mut R,
    challenge: &str,
    width: u32,
    height: u32,
    options: &LayoutOptions,
) -> CaptchaLayout {
    let chars: Vec<char> = challenge.chars().collect();
    let rows = options.rows.max(1);
    let extra = rng.gen_range(1..=2);
    let cols = chars.len() + extra;

    let canvas = BoundingBox::from_xywh(0.0, 0.0, width as f64, height as f64);
    let padding = options.padding.clamp(0.0, 0.45);
    let content = canvas.inset(width as f64 * padding, height as f64 * padding);

    let widths = jittered_sizes(rng, content.width(), cols, COLUMN_JITTER);
    let hosts = glyph_columns(rng, cols, chars.len());

    let mut grid: Vec<Vec<Option<Cell>>> = vec![vec![None; cols]; rows];
    let mut x = content.lt.x;
    let mut next_glyph = 0;
    for (col, &w) in widths.iter().enumerate() {
        let heights = jittered_sizes(rng, content.height(), rows, ROW_JITTER);
        let glyph_row = hosts[col].then(|| rng.gen_range(0..rows));
        let mut y = content.lt.y;
        for (row, &h) in heights.iter().enumerate() {
            let bbox = BoundingBox::from_xywh(x, y, w, h).clamp_to(&content);
            let role = if glyph_row == Some(row) {
                let role = CellRole::Glyph {
                    ch: chars[next_glyph],
                    index: next_glyph,
                };
                next_glyph += 1;
                role
            } else {
                match rng.gen_range(0..3) {
                    0 => CellRole::Decoy(DecoyKind::Triangle),
                    1 => CellRole::Decoy(DecoyKind::Star),
                    _ => CellRole::Empty,
                }
            };
            grid[row][col] = Some(Cell {
                bbox,
                row,
                col,
                role,
                background: None,
            });
            y += h;
        }
        x += w;
    }

    let seed = options.seed_color.unwrap_or_else(|| {
        let mut c = random_hsv(rng, HsvOverrides::default());
        c.a = None;
        c
    });
    let nodes = background_nodes(rng, &seed, cols + 2);
    let vector = background_vector(rng, width, height);

    let axis = GradientAxis::new(&vector);
    let table = generate_gradient_colors(&nodes, axis.length(), options.interpolation);
    let cells: Vec<Cell> = grid
        .into_iter()
        .flatten()
        .flatten()
        .map(|mut cell| {
            let c = cell.bbox.center();
            cell.background = Some(table[axis.index(c.x, c.y)]);
            cell
        })
        .collect();

    log::debug!(
        "captcha layout: {} glyphs in {}x{} grid ({} glyph-free columns)",
        chars.len(),
        rows,
        cols,
        extra
    );
    CaptchaLayout {
        width,
        height,
        rows,
        cols,
        content,
        cells,
        vector,
        nodes,
        interpolation: options.interpolation,
    }
}
