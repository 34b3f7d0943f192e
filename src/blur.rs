//! Stack blur.
//!
//! A separable tent-kernel blur computed with running sums, so the cost per
//! pixel is independent of the radius. Edges extend the border pixel.
//! With radius 1 the kernel is `[1 2 1] / 4` in each direction, i.e. the
//! classic 3×3 Gaussian `[1 2 1; 2 4 2; 1 2 1] / 16`.

use crate::rendering_buffer::{RasterBuffer, BPP};

/// Largest supported radius.
pub const MAX_RADIUS: u32 = 254;

type Px = [u32; BPP];

#[inline]
fn add(a: &mut Px, b: &Px) {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
}

#[inline]
fn sub(a: &mut Px, b: &Px) {
    for (x, y) in a.iter_mut().zip(b) {
        *x -= y;
    }
}

/// Blur one line of pixels in place.
fn blur_line(line: &mut [Px], out: &mut Vec<Px>, radius: usize) {
    let n = line.len();
    if n == 0 {
        return;
    }
    let last = n as isize - 1;
    let ext = |i: isize| line[i.clamp(0, last) as usize];
    let r = radius as isize;
    let div = ((radius + 1) * (radius + 1)) as u32;

    let mut sum: Px = [0; BPP];
    let mut sum_out: Px = [0; BPP];
    let mut sum_in: Px = [0; BPP];
    for i in -r..=r {
        let p = ext(i);
        let w = (r + 1 - i.abs()) as u32;
        for c in 0..BPP {
            sum[c] += p[c] * w;
        }
        if i <= 0 {
            add(&mut sum_out, &p);
        } else {
            add(&mut sum_in, &p);
        }
    }

    out.clear();
    for x in 0..n as isize {
        let mut px = [0u32; BPP];
        for c in 0..BPP {
            px[c] = (sum[c] + div / 2) / div;
        }
        out.push(px);

        sub(&mut sum, &sum_out);
        sub(&mut sum_out, &ext(x - r));
        add(&mut sum_in, &ext(x + r + 1));
        add(&mut sum, &sum_in);
        let next = ext(x + 1);
        add(&mut sum_out, &next);
        sub(&mut sum_in, &next);
    }
    line.copy_from_slice(&out[..]);
}

/// Blur `buf` in place with independent horizontal and vertical radii.
/// Radii above [`MAX_RADIUS`] are clamped; 0 skips that direction.
pub fn stack_blur(buf: &mut RasterBuffer, rx: u32, ry: u32) {
    let w = buf.width() as usize;
    let h = buf.height() as usize;
    if w == 0 || h == 0 {
        return;
    }
    let rx = rx.min(MAX_RADIUS) as usize;
    let ry = ry.min(MAX_RADIUS) as usize;
    let mut scratch = Vec::with_capacity(w.max(h));

    if rx > 0 {
        let mut line: Vec<Px> = vec![[0; BPP]; w];
        for y in 0..h as u32 {
            let row = buf.row_mut(y);
            for (dst, src) in line.iter_mut().zip(row.chunks_exact(BPP)) {
                *dst = [src[0] as u32, src[1] as u32, src[2] as u32, src[3] as u32];
            }
            blur_line(&mut line, &mut scratch, rx);
            for (dst, src) in row.chunks_exact_mut(BPP).zip(&line) {
                for c in 0..BPP {
                    dst[c] = src[c] as u8;
                }
            }
        }
    }

    if ry > 0 {
        let stride = buf.stride();
        let data = buf.data_mut();
        let mut line: Vec<Px> = vec![[0; BPP]; h];
        for x in 0..w {
            for (y, dst) in line.iter_mut().enumerate() {
                let o = y * stride + x * BPP;
                *dst = [data[o] as u32, data[o + 1] as u32, data[o + 2] as u32, data[o + 3] as u32];
            }
            blur_line(&mut line, &mut scratch, ry);
            for (y, src) in line.iter().enumerate() {
                let o = y * stride + x * BPP;
                for c in 0..BPP {
                    data[o + c] = src[c] as u8;
                }
            }
        }
    }
}
