//! Image orientation as an element of the D4 dihedral group, with the EXIF
//! mapping and lossless application to a [`RasterBuffer`].
//!
//! ```text
//!     1: Identity    2: FlipH       3: Rotate180   4: FlipV
//!     5: Transpose   6: Rotate90    7: Transverse  8: Rotate270
//! ```

use crate::rendering_buffer::{RasterBuffer, BPP};

/// A clockwise rotation in quarter turns, optionally followed by a
/// horizontal flip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Orientation {
    /// Quarter turns clockwise, 0-3.
    pub rotation: u8,
    pub flip: bool,
}

impl Orientation {
    pub const IDENTITY: Self = Self {
        rotation: 0,
        flip: false,
    };
    pub const FLIP_H: Self = Self {
        rotation: 0,
        flip: true,
    };
    pub const ROTATE_180: Self = Self {
        rotation: 2,
        flip: false,
    };
    pub const FLIP_V: Self = Self {
        rotation: 2,
        flip: true,
    };
    pub const TRANSPOSE: Self = Self {
        rotation: 1,
        flip: true,
    };
    pub const ROTATE_90: Self = Self {
        rotation: 1,
        flip: false,
    };
    pub const TRANSVERSE: Self = Self {
        rotation: 3,
        flip: true,
    };
    pub const ROTATE_270: Self = Self {
        rotation: 3,
        flip: false,
    };

    /// Indexed by EXIF value − 1.
    const EXIF: [Self; 8] = [
        Self::IDENTITY,
        Self::FLIP_H,
        Self::ROTATE_180,
        Self::FLIP_V,
        Self::TRANSPOSE,
        Self::ROTATE_90,
        Self::TRANSVERSE,
        Self::ROTATE_270,
    ];

    /// From an EXIF orientation tag (1-8). 0 (unset) maps to the identity;
    /// other out-of-range values give `None`.
    pub fn from_exif(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::IDENTITY),
            1..=8 => Some(Self::EXIF[(value - 1) as usize]),
            _ => None,
        }
    }

    pub fn to_exif(self) -> u8 {
        Self::EXIF
            .iter()
            .position(|&o| o == self.normalized())
            .map_or(1, |i| i as u8 + 1)
    }

    /// A clockwise right-angle rotation, if `degrees` is a multiple of 90.
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        let quarter = degrees / 90.0;
        if !quarter.is_finite() || quarter.fract() != 0.0 {
            return None;
        }
        Some(Self {
            rotation: (quarter as i64).rem_euclid(4) as u8,
            flip: false,
        })
    }

    /// Clockwise rotation in degrees, ignoring the flip.
    pub fn degrees(self) -> f64 {
        (self.rotation & 3) as f64 * 90.0
    }

    fn normalized(self) -> Self {
        Self {
            rotation: self.rotation & 3,
            flip: self.flip,
        }
    }

    pub fn is_identity(self) -> bool {
        self.rotation & 3 == 0 && !self.flip
    }

    pub fn swaps_axes(self) -> bool {
        self.rotation % 2 == 1
    }

    /// Undo `self`. Flipped orientations are their own inverse.
    pub fn inverse(self) -> Self {
        if self.flip {
            self.normalized()
        } else {
            Self {
                rotation: (4 - (self.rotation & 3)) & 3,
                flip: false,
            }
        }
    }

    /// Output size for a `w × h` source.
    pub fn dimensions(self, w: u32, h: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Where source pixel `(x, y)` of a `w × h` image lands.
    pub fn map_point(self, x: u32, y: u32, w: u32, h: u32) -> (u32, u32) {
        match (self.rotation & 3, self.flip) {
            (0, false) => (x, y),
            (0, true) => (w - 1 - x, y),
            (1, false) => (h - 1 - y, x),
            (1, true) => (y, x),
            (2, false) => (w - 1 - x, h - 1 - y),
            (2, true) => (x, h - 1 - y),
            (3, false) => (y, w - 1 - x),
            _ => (h - 1 - y, w - 1 - x),
        }
    }

    /// Reorient `src`. Pixels are moved, never resampled.
    pub fn apply(self, src: &RasterBuffer) -> RasterBuffer {
        if self.is_identity() {
            return src.clone();
        }
        let (w, h) = (src.width(), src.height());
        let (dw, dh) = self.dimensions(w, h);
        let mut dst = RasterBuffer::new(dw, dh);
        let dst_stride = dst.stride();
        let out = dst.data_mut();
        for y in 0..h {
            let row = src.row(y);
            for x in 0..w {
                let (dx, dy) = self.map_point(x, y, w, h);
                let s = x as usize * BPP;
                let d = dy as usize * dst_stride + dx as usize * BPP;
                out[d..d + BPP].copy_from_slice(&row[s..s + BPP]);
            }
        }
        dst
    }
}
