//! Pixel-level helpers shared by the body and overlay passes.

use glam::DVec2;
use image::{Rgb, Rgba, RgbaImage};

/// 2×2 ordered dither matrix, normalized to `[0, 1)`.
const BAYER_2X2: [[f64; 2]; 2] = [[0.0, 0.5], [0.75, 0.25]];

#[inline]
pub(crate) fn bayer2(x: u32, y: u32) -> f64 {
    BAYER_2X2[(y % 2) as usize][(x % 2) as usize]
}

/// Scale a colour, rounding and clamping each channel to `0..=255`.
pub(crate) fn shade(color: Rgb<u8>, factor: f64) -> Rgb<u8> {
    Rgb(color.0.map(|c| (f64::from(c) * factor).round().clamp(0.0, 255.0) as u8))
}

pub(crate) fn mix(a: Rgb<u8>, b: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 3];
    for (o, (x, y)) in out.iter_mut().zip(a.0.iter().zip(b.0.iter())) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        *o = (x + (y - x) * t).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

pub(crate) fn put_opaque(img: &mut RgbaImage, x: u32, y: u32, color: Rgb<u8>) {
    let [r, g, b] = color.0;
    img.put_pixel(x, y, Rgba([r, g, b, 255]));
}

/// Source-over composite of `color` at `alpha` onto pixel `(x, y)`.
pub(crate) fn blend_over(img: &mut RgbaImage, x: u32, y: u32, color: Rgb<u8>, alpha: f64) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst = img.get_pixel(x, y).0;
    let da = f64::from(dst[3]) / 255.0;
    let out_a = a + da * (1.0 - a);
    if out_a <= 0.0 {
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let src = f64::from(color.0[c]);
        let dstc = f64::from(dst[c]);
        let v = (src * a + dstc * da * (1.0 - a)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    img.put_pixel(x, y, Rgba(out));
}

/// Call `paint` for every pixel whose centre lies inside the convex polygon
/// `corners` (either winding). Degenerate polygons paint nothing.
pub(crate) fn fill_convex(
    width: u32,
    height: u32,
    corners: &[DVec2; 4],
    mut paint: impl FnMut(u32, u32),
) {
    let area: f64 = (0..4)
        .map(|k| corners[k].perp_dot(corners[(k + 1) % 4]))
        .sum();
    if area.abs() < 1e-9 {
        return;
    }
    let sign = area.signum();

    let (mut min, mut max) = (corners[0], corners[0]);
    for c in &corners[1..] {
        min = min.min(*c);
        max = max.max(*c);
    }
    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = (max.x.ceil().max(0.0) as u32).min(width);
    let y1 = (max.y.ceil().max(0.0) as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let p = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let inside = (0..4).all(|k| {
                let a = corners[k];
                let b = corners[(k + 1) % 4];
                (b - a).perp_dot(p - a) * sign >= 0.0
            });
            if inside {
                paint(x, y);
            }
        }
    }
}
