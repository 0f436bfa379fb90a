//! Ring, cloud, and atmosphere layers composited around the body.

use std::f64::consts::PI;

use glam::{DVec2, DVec3};
use image::{Rgb, RgbaImage};
use orrery_terrain::{Fbm, Mulberry32, ValueNoise, det_atan2, det_cos, det_sin, det_sqrt};

use crate::isometric::{BodyMask, IsoLayout};
use crate::palette::Palette;
use crate::params::RingKind;
use crate::raster::{blend_over, mix};

const RING_TILT: f64 = -0.45;
const RING_SQUASH: f64 = 0.42;
const RING_INNER: f64 = 1.18;
const RING_BANDS: f64 = 6.0;
const RING_NOISE: Fbm = Fbm {
    octaves: 3,
    persistence: 0.5,
    lacunarity: 2.0,
};

const CLOUD_COLOR: Rgb<u8> = Rgb([242, 247, 255]);
const CLOUD_ALPHA: f64 = 0.6;
pub(crate) const MAX_CLOUD_BLOBS: usize = 5;

const ATMOSPHERE_INNER: f64 = 0.88;
const ATMOSPHERE_OUTER: f64 = 1.35;
const ATMOSPHERE_PEAK_ALPHA: f64 = 0.55;

/// Which arc of the ring a pixel belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RingHalf {
    /// Upper arc, occluded by the body.
    Back,
    /// Lower arc, drawn over the body.
    Front,
}

/// A pixel's position within the ring band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RingSample {
    pub half: RingHalf,
    /// Radial position across the band, `0` at the inner edge.
    pub radial: f64,
    pub angle: f64,
}

/// Locate pixel `(x, y)` in the tilted elliptical ring band, if it is inside.
pub(crate) fn ring_sample(layout: &IsoLayout, kind: RingKind, x: u32, y: u32) -> Option<RingSample> {
    if !kind.is_present() {
        return None;
    }
    let d = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5) - layout.origin;
    let (s, c) = (det_sin(RING_TILT), det_cos(RING_TILT));
    let rx = d.x * c + d.y * s;
    let ry = -d.x * s + d.y * c;
    let ey = ry / RING_SQUASH;
    let r = det_sqrt(rx * rx + ey * ey);

    let inner = layout.radius * RING_INNER;
    let width = layout.radius * kind.width_factor();
    if r < inner || r > inner + width {
        return None;
    }
    Some(RingSample {
        half: if ry > 0.0 { RingHalf::Front } else { RingHalf::Back },
        radial: (r - inner) / width,
        angle: det_atan2(ey, rx),
    })
}

/// Composite one arc of the ring.
pub(crate) fn draw_ring(
    img: &mut RgbaImage,
    layout: &IsoLayout,
    kind: RingKind,
    palette: &Palette,
    noise: &ValueNoise,
    half: RingHalf,
) {
    let (width, height) = img.dimensions();
    for y in 0..height {
        for x in 0..width {
            let Some(sample) = ring_sample(layout, kind, x, y) else {
                continue;
            };
            if sample.half != half {
                continue;
            }
            let p = DVec3::new(
                det_cos(sample.angle) * 2.5,
                det_sin(sample.angle) * 2.5,
                sample.radial * 3.0,
            );
            let n = noise.fbm(p, &RING_NOISE);
            let centre_weight = 1.0 - (2.0 * sample.radial - 1.0).abs();
            let depth = match half {
                RingHalf::Back => 0.7,
                RingHalf::Front => 1.0,
            };
            let alpha = ((0.55 + n * 0.2 + centre_weight * 0.15) * depth).clamp(0.1, 0.9);

            let band = (sample.radial * RING_BANDS) as u32 % 2;
            let color = if band == 0 {
                palette.ring
            } else {
                mix(palette.ring, palette.highlight, 0.35)
            };
            blend_over(img, x, y, color, alpha);
        }
    }
}

/// One soft cloud ellipse, in units of the body radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CloudBlob {
    pub offset: DVec2,
    pub radius: f64,
    pub stretch: f64,
}

/// Seeded cloud layout. Always consumes the same number of draws so later
/// draws from `rng` do not depend on density or visibility.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CloudLayout {
    pub blobs: [CloudBlob; MAX_CLOUD_BLOBS],
    pub active: usize,
}

impl CloudLayout {
    pub(crate) fn roll(rng: &mut Mulberry32, density: f64) -> Self {
        let count_roll = rng.next_f64();
        let blobs = std::array::from_fn(|_| CloudBlob {
            offset: DVec2::new(rng.next_range(-0.6, 0.6), rng.next_range(-0.5, 0.5)),
            radius: rng.next_range(0.18, 0.32),
            stretch: rng.next_range(1.2, 2.0),
        });
        let extra = (density / 40.0).floor() as usize;
        let active = (2 + (count_roll * 2.0) as usize + extra).min(MAX_CLOUD_BLOBS);
        Self { blobs, active }
    }
}

/// Composite the active cloud blobs inside the circular clip, over body pixels.
pub(crate) fn draw_clouds(
    img: &mut RgbaImage,
    layout: &IsoLayout,
    clouds: &CloudLayout,
    density: f64,
    mask: &BodyMask,
) {
    let (width, height) = img.dimensions();
    let base_alpha = CLOUD_ALPHA * (0.4 + 0.6 * density / 100.0);
    let r = layout.radius;

    for y in 0..height {
        for x in 0..width {
            if !mask.contains(x, y) {
                continue;
            }
            let d = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5) - layout.origin;
            if d.length() > r {
                continue;
            }
            for blob in &clouds.blobs[..clouds.active] {
                let local = d - blob.offset * r;
                let q = DVec2::new(local.x / blob.stretch, local.y) / (blob.radius * r);
                let t = q.length_squared();
                if t < 1.0 {
                    let falloff = 1.0 - t * t;
                    blend_over(img, x, y, CLOUD_COLOR, base_alpha * falloff);
                }
            }
        }
    }
}

/// Radial glow in the annulus `[0.88R, 1.35R]`, strongest in the middle.
pub(crate) fn draw_atmosphere(img: &mut RgbaImage, layout: &IsoLayout, palette: &Palette, level: f64) {
    let peak = ATMOSPHERE_PEAK_ALPHA * (level / 100.0);
    if peak <= 0.0 {
        return;
    }
    let (width, height) = img.dimensions();
    let inner = layout.radius * ATMOSPHERE_INNER;
    let span = layout.radius * (ATMOSPHERE_OUTER - ATMOSPHERE_INNER);

    for y in 0..height {
        for x in 0..width {
            let d = (DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5) - layout.origin).length();
            let t = (d - inner) / span;
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            blend_over(img, x, y, palette.atmosphere, peak * det_sin(PI * t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PalettePreset;
    use orrery_terrain::PlanetSeed;

    #[test]
    fn test_no_ring_means_no_samples() {
        let layout = IsoLayout::new(64, RingKind::None);
        for y in 0..64 {
            for x in 0..64 {
                assert!(ring_sample(&layout, RingKind::None, x, y).is_none());
            }
        }
    }

    #[test]
    fn test_ring_halves_split_above_and_below() {
        let layout = IsoLayout::new(128, RingKind::Wide);
        let (mut back, mut front) = (0, 0);
        for y in 0..128 {
            for x in 0..128 {
                if let Some(s) = ring_sample(&layout, RingKind::Wide, x, y) {
                    assert!((0.0..=1.0).contains(&s.radial));
                    match s.half {
                        RingHalf::Back => back += 1,
                        RingHalf::Front => front += 1,
                    }
                }
            }
        }
        assert!(back > 0 && front > 0);
        let ratio = f64::from(back) / f64::from(front);
        assert!((0.8..1.25).contains(&ratio), "unbalanced ring halves: {ratio}");
    }

    #[test]
    fn test_ring_fits_inside_texture() {
        let layout = IsoLayout::new(64, RingKind::Wide);
        for i in 0..64 {
            for (x, y) in [(0, i), (63, i), (i, 0), (i, 63)] {
                assert!(ring_sample(&layout, RingKind::Wide, x, y).is_none(), "ring touches border at {x},{y}");
            }
        }
    }

    #[test]
    fn test_wide_ring_covers_more_than_thin() {
        let count = |kind| {
            let layout = IsoLayout::new(96, kind);
            (0..96)
                .flat_map(|y| (0..96).map(move |x| (x, y)))
                .filter(|&(x, y)| ring_sample(&layout, kind, x, y).is_some())
                .count()
        };
        assert!(count(RingKind::Wide) > count(RingKind::Thin));
    }

    #[test]
    fn test_cloud_layout_draw_count_is_fixed() {
        let mut sparse = Mulberry32::new(PlanetSeed::new(8));
        let mut dense = Mulberry32::new(PlanetSeed::new(8));
        let a = CloudLayout::roll(&mut sparse, 0.0);
        let b = CloudLayout::roll(&mut dense, 100.0);
        assert_eq!(sparse, dense);
        assert_eq!(a.blobs, b.blobs);
        assert!(a.active >= 2 && a.active <= 3);
        assert!(b.active >= 4 && b.active <= MAX_CLOUD_BLOBS);
    }

    #[test]
    fn test_atmosphere_leaves_centre_and_corners_untouched() {
        let layout = IsoLayout::new(64, RingKind::None);
        let mut img = RgbaImage::new(64, 64);
        draw_atmosphere(&mut img, &layout, PalettePreset::Earth.palette(), 100.0);
        assert_eq!(img.get_pixel(32, 32).0[3], 0);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        let edge_x = (32.0 + layout.radius * 1.1) as u32;
        assert!(img.get_pixel(edge_x, 32).0[3] > 0);
    }

    #[test]
    fn test_zero_atmosphere_draws_nothing() {
        let layout = IsoLayout::new(32, RingKind::None);
        let mut img = RgbaImage::new(32, 32);
        draw_atmosphere(&mut img, &layout, PalettePreset::Lava.palette(), 0.0);
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }
}
