//! Isometric cube body: projection, biome bands, and per-quad lighting.

use glam::{DVec2, DVec3};
use image::{Rgb, RgbaImage};
use orrery_cubesphere::{CubeFace, face_uv_to_cube_point};
use orrery_terrain::HeightField;

use crate::palette::Palette;
use crate::params::RingKind;
use crate::raster::{bayer2, fill_convex, put_opaque, shade};

/// Faces visible from the fixed viewpoint, in draw order, with their shade
/// multipliers for a single light from the upper right front.
pub const VISIBLE_FACES: [(CubeFace, f64); 3] = [
    (CubeFace::Right, 0.72),
    (CubeFace::Front, 0.82),
    (CubeFace::Top, 1.06),
];

/// Light direction in face `(u, v)` space used for relief shading.
const RELIEF_LIGHT: DVec2 = DVec2::new(-0.6, 0.8);
const RELIEF_STRENGTH: f64 = 0.35;
const RELIEF_LIMIT: f64 = 0.3;
const DITHER_STRENGTH: f64 = 0.12;

/// Screen placement of the projected cube inside a square texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoLayout {
    pub size: u32,
    pub origin: DVec2,
    pub scale_x: f64,
    pub scale_y: f64,
    pub scale_z: f64,
    /// Radius of the body silhouette, used to place overlays.
    pub radius: f64,
}

impl IsoLayout {
    /// Layout for a `size`-pixel texture. The body shrinks when a ring has to
    /// fit around it.
    #[must_use]
    pub fn new(size: u32, ring: RingKind) -> Self {
        let s = f64::from(size);
        let scale_x = if ring.is_present() { s * 0.15 } else { s * 0.18 };
        Self {
            size,
            origin: DVec2::splat(s * 0.5),
            scale_x,
            scale_y: scale_x * 0.5,
            scale_z: scale_x,
            radius: scale_x * 2.0,
        }
    }

    /// `screenX = ox + (x − z)·scaleX`, `screenY = oy + (x + z)·scaleY − y·scaleZ`.
    #[must_use]
    pub fn project(&self, p: DVec3) -> DVec2 {
        DVec2::new(
            self.origin.x + (p.x - p.z) * self.scale_x,
            self.origin.y + (p.x + p.z) * self.scale_y - p.y * self.scale_z,
        )
    }
}

/// Height bands relative to the sea level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    DeepOcean,
    ShallowOcean,
    Lowland,
    Highland,
    Peak,
}

impl Biome {
    #[must_use]
    pub fn classify(height: f64, sea_level: f64) -> Self {
        if height < sea_level * 0.8 {
            return Biome::DeepOcean;
        }
        if height < sea_level {
            return Biome::ShallowOcean;
        }
        let t = (height - sea_level) / (1.0 - sea_level).max(f64::EPSILON);
        if t < 0.3 {
            Biome::Lowland
        } else if t < 0.6 {
            Biome::Highland
        } else {
            Biome::Peak
        }
    }

    #[must_use]
    pub fn is_water(self) -> bool {
        matches!(self, Biome::DeepOcean | Biome::ShallowOcean)
    }

    #[must_use]
    pub fn color(self, palette: &Palette) -> Rgb<u8> {
        match self {
            Biome::DeepOcean => palette.ocean_dark,
            Biome::ShallowOcean => palette.ocean_light,
            Biome::Lowland => palette.land_light,
            Biome::Highland => palette.land_dark,
            Biome::Peak => palette.highlight,
        }
    }
}

/// Pixels covered by the body, row-major.
pub(crate) struct BodyMask {
    width: u32,
    covered: Vec<bool>,
}

impl BodyMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            covered: vec![false; (width * height) as usize],
        }
    }

    pub(crate) fn contains(&self, x: u32, y: u32) -> bool {
        self.covered[(y * self.width + x) as usize]
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.covered.iter().filter(|c| **c).count()
    }
}

/// Relief light factor for texel `(i, j)` from a central-difference gradient.
fn relief(field: &HeightField, face: CubeFace, i: i64, j: i64) -> f64 {
    let gu = field.get(face, i + 1, j) - field.get(face, i - 1, j);
    let gv = field.get(face, i, j + 1) - field.get(face, i, j - 1);
    let slope = DVec2::new(gu, gv) * (f64::from(field.resolution()) / 4.0);
    let lit = -slope.dot(RELIEF_LIGHT.normalize()) * RELIEF_STRENGTH;
    1.0 + lit.clamp(-RELIEF_LIMIT, RELIEF_LIMIT)
}

/// Draw the three visible faces as tessellated, lit quads.
pub(crate) fn draw_body(
    img: &mut RgbaImage,
    layout: &IsoLayout,
    field: &HeightField,
    palette: &Palette,
    sea_level: f64,
) -> BodyMask {
    let (width, height) = img.dimensions();
    let mut mask = BodyMask::new(width, height);
    let n = field.resolution();
    let step = 2.0 / f64::from(n);

    for (face, face_shade) in VISIBLE_FACES {
        for j in 0..n {
            let v0 = -1.0 + f64::from(j) * step;
            let v1 = v0 + step;
            for i in 0..n {
                let u0 = -1.0 + f64::from(i) * step;
                let u1 = u0 + step;

                let h = field.get(face, i64::from(i), i64::from(j));
                let biome = Biome::classify(h, sea_level);
                let light = if biome.is_water() {
                    1.0
                } else {
                    relief(field, face, i64::from(i), i64::from(j))
                };
                let dither = (bayer2(i, j) - 0.375) * DITHER_STRENGTH;
                let color = shade(biome.color(palette), (light + dither) * face_shade);

                let corners = [(u0, v0), (u1, v0), (u1, v1), (u0, v1)]
                    .map(|(u, v)| layout.project(face_uv_to_cube_point(face, u, v)));
                fill_convex(width, height, &corners, |x, y| {
                    put_opaque(img, x, y, color);
                    mask.covered[(y * width + x) as usize] = true;
                });
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PalettePreset;
    use orrery_terrain::{HeightFieldParams, ValueNoise};

    #[test]
    fn test_projection_of_visible_corners() {
        let layout = IsoLayout::new(100, RingKind::None);
        let s = layout.scale_x;
        let near_top = layout.project(DVec3::new(1.0, 1.0, 1.0));
        assert!((near_top - DVec2::new(50.0, 50.0)).length() < 1e-9);
        let right = layout.project(DVec3::new(1.0, 1.0, -1.0));
        assert!((right - DVec2::new(50.0 + 2.0 * s, 50.0 - s)).length() < 1e-9);
        let bottom = layout.project(DVec3::new(1.0, -1.0, 1.0));
        assert!((bottom - DVec2::new(50.0, 50.0 + 2.0 * s)).length() < 1e-9);
    }

    #[test]
    fn test_ring_shrinks_body() {
        let plain = IsoLayout::new(64, RingKind::None);
        let ringed = IsoLayout::new(64, RingKind::Thin);
        assert!(ringed.radius < plain.radius);
    }

    #[test]
    fn test_biome_bands_follow_sea_level() {
        assert_eq!(Biome::classify(0.1, 0.5), Biome::DeepOcean);
        assert_eq!(Biome::classify(0.45, 0.5), Biome::ShallowOcean);
        assert_eq!(Biome::classify(0.55, 0.5), Biome::Lowland);
        assert_eq!(Biome::classify(0.7, 0.5), Biome::Highland);
        assert_eq!(Biome::classify(0.95, 0.5), Biome::Peak);
        assert_eq!(Biome::classify(0.45, 0.3), Biome::Lowland);
    }

    #[test]
    fn test_biome_colours_come_from_palette() {
        let p = PalettePreset::Ice.palette();
        assert_eq!(Biome::DeepOcean.color(p), p.ocean_dark);
        assert_eq!(Biome::Peak.color(p), p.highlight);
    }

    #[test]
    fn test_body_covers_a_hexagon_and_leaves_corners_clear() {
        let layout = IsoLayout::new(64, RingKind::None);
        let field = HeightField::build(
            &ValueNoise::new(3),
            &HeightFieldParams {
                resolution: 16,
                ..HeightFieldParams::default()
            },
        );
        let mut img = RgbaImage::new(64, 64);
        let mask = draw_body(&mut img, &layout, &field, PalettePreset::Earth.palette(), 0.5);

        assert!(mask.contains(32, 32));
        assert!(!mask.contains(0, 0));
        assert_eq!(img.get_pixel(32, 32).0[3], 255);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);

        // Hexagon area is 12·s²; allow for edge rasterization.
        let expected = 12.0 * layout.scale_x * layout.scale_x;
        let covered = mask.count() as f64;
        assert!((covered - expected).abs() / expected < 0.1, "{covered} vs {expected}");
    }
}
