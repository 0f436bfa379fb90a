//! Planet texture generation entry point.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use orrery_terrain::{HeightField, Mulberry32, PlanetSeed, ValueNoise};
use serde::Serialize;

use crate::error::PlanetError;
use crate::isometric::{IsoLayout, draw_body};
use crate::overlay::{CloudLayout, RingHalf, draw_atmosphere, draw_clouds, draw_ring};
use crate::palette::PalettePreset;
use crate::params::{GenerationParams, PlanetOptions, RingKind};

/// Name reported for the cube-projected isometric style.
pub const STYLE_NAME: &str = "cube";

/// Lattice seed offset for ring noise, keeping it independent of terrain.
const RING_NOISE_SEED_OFFSET: u32 = 701;

/// Presentation-only orbit parameters derived from the planet's seed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitParams {
    /// In `[450, 1950)`.
    pub orbit_radius: f64,
    /// In `[0.05, 0.25)`.
    pub orbit_speed: f64,
    /// In `[0.08, 0.43)`.
    pub rotation_speed: f64,
}

impl OrbitParams {
    fn roll(rng: &mut Mulberry32) -> Self {
        Self {
            orbit_radius: 450.0 + (rng.next_f64() * 1500.0).floor(),
            orbit_speed: 0.05 + rng.next_f64() * 0.2,
            rotation_speed: 0.08 + rng.next_f64() * 0.35,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetMetadata {
    pub seed: PlanetSeed,
    #[serde(rename = "type")]
    pub palette: PalettePreset,
    pub style: &'static str,
    pub ring_kind: RingKind,
    pub has_clouds: bool,
    #[serde(flatten)]
    pub orbit: OrbitParams,
}

/// A rasterized planet and the choices that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetTexture {
    pub image: RgbaImage,
    pub metadata: PlanetMetadata,
    pub params: GenerationParams,
}

impl PlanetTexture {
    /// Encode the image as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, PlanetError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Write the image to `path` as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PlanetError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// Generate one planet texture.
///
/// Pure and deterministic: identical options give byte-identical pixels and
/// identical metadata. Out-of-range options are clamped, never rejected.
pub fn generate_planet_texture(options: &PlanetOptions) -> PlanetTexture {
    let seed = PlanetSeed::new(options.seed);
    let mut rng = Mulberry32::new(seed);
    let params = GenerationParams::resolve(options, &mut rng);
    let clouds = CloudLayout::roll(&mut rng, params.cloud_density);
    let orbit = OrbitParams::roll(&mut rng);

    let palette = params.palette.palette();
    let layout = IsoLayout::new(params.size, params.ring);
    let terrain_noise = ValueNoise::new(seed.get());
    let ring_noise = ValueNoise::new(seed.get().wrapping_add(RING_NOISE_SEED_OFFSET));
    let field = HeightField::build(&terrain_noise, &params.height_field_params());

    let mut image = RgbaImage::new(params.size, params.size);
    draw_ring(&mut image, &layout, params.ring, palette, &ring_noise, RingHalf::Back);
    let mask = draw_body(&mut image, &layout, &field, palette, params.sea_level);
    if params.has_clouds {
        draw_clouds(&mut image, &layout, &clouds, params.cloud_density, &mask);
    }
    draw_atmosphere(&mut image, &layout, palette, params.atmosphere);
    draw_ring(&mut image, &layout, params.ring, palette, &ring_noise, RingHalf::Front);

    tracing::debug!(
        seed = seed.get(),
        palette = %params.palette,
        ring = params.ring.name(),
        clouds = params.has_clouds,
        size = params.size,
        "generated planet texture"
    );

    PlanetTexture {
        image,
        metadata: PlanetMetadata {
            seed,
            palette: params.palette,
            style: STYLE_NAME,
            ring_kind: params.ring,
            has_clouds: params.has_clouds,
            orbit,
        },
        params,
    }
}
