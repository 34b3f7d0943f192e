//! Owned RGBA32 pixel storage.
//!
//! [`RasterBuffer`] owns a tightly packed, top-down RGBA buffer (4 bytes per
//! pixel, straight alpha). It is released when dropped; there is no separate
//! destroy step. Row access is by safe slices.

use crate::color::Rgba8;

/// Bytes per pixel.
pub const BPP: usize = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl core::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RasterBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * BPP],
        }
    }

    /// A buffer filled with `c`.
    pub fn filled(width: u32, height: u32, c: Rgba8) -> Self {
        let mut buf = Self::new(width, height);
        buf.clear(c);
        buf
    }

    /// Wrap existing RGBA bytes. Returns `None` if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * BPP {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * BPP
    }

    /// Row `y` as a slice of `width * 4` bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {} out of bounds (height={})", y, self.height);
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "row {} out of bounds (height={})", y, self.height);
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba8> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let off = self.offset(x as u32, y as u32);
        let p = &self.data[off..off + BPP];
        Some(Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    /// Overwrite the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn put(&mut self, x: i32, y: i32, c: Rgba8) {
        if !self.in_bounds(x, y) {
            return;
        }
        let off = self.offset(x as u32, y as u32);
        self.data[off..off + BPP].copy_from_slice(&[c.r, c.g, c.b, c.a]);
    }

    pub fn clear(&mut self, c: Rgba8) {
        for px in self.data.chunks_exact_mut(BPP) {
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Copy out the `w × h` region starting at `(x, y)`, clipped to the buffer.
    pub fn sub_image(&self, x: u32, y: u32, w: u32, h: u32) -> RasterBuffer {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);
        let mut out = RasterBuffer::new(w, h);
        let len = w as usize * BPP;
        for row in 0..h {
            let src = self.offset(x, y + row);
            out.row_mut(row)
                .copy_from_slice(&self.data[src..src + len]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let buf = RasterBuffer::new(3, 2);
        assert_eq!(buf.data().len(), 24);
        assert_eq!(buf.get(2, 1), Some(Rgba8::transparent()));
    }

    #[test]
    fn test_put_get_and_bounds() {
        let mut buf = RasterBuffer::new(4, 4);
        let c = Rgba8::new(1, 2, 3, 4);
        buf.put(3, 3, c);
        buf.put(4, 0, c);
        buf.put(-1, 0, c);
        assert_eq!(buf.get(3, 3), Some(c));
        assert_eq!(buf.get(4, 0), None);
        assert_eq!(buf.get(0, -1), None);
    }

    #[test]
    fn test_from_raw_checks_len() {
        assert!(RasterBuffer::from_raw(2, 2, vec![0; 16]).is_some());
        assert!(RasterBuffer::from_raw(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_rows() {
        let mut buf = RasterBuffer::new(2, 3);
        buf.row_mut(1)[4..8].copy_from_slice(&[9, 9, 9, 9]);
        assert_eq!(buf.get(1, 1), Some(Rgba8::new(9, 9, 9, 9)));
        assert_eq!(buf.row(1).len(), 8);
    }

    #[test]
    fn test_sub_image_clips() {
        let mut buf = RasterBuffer::new(5, 5);
        buf.put(4, 4, Rgba8::new_opaque(7, 7, 7));
        let sub = buf.sub_image(3, 3, 10, 10);
        assert_eq!((sub.width(), sub.height()), (2, 2));
        assert_eq!(sub.get(1, 1), Some(Rgba8::new_opaque(7, 7, 7)));
    }

    #[test]
    fn test_filled() {
        let buf = RasterBuffer::filled(2, 2, Rgba8::new_opaque(5, 6, 7));
        assert!(buf.data().chunks(4).all(|p| p == [5, 6, 7, 255]));
    }
}
