//! Procedural pixel-planet textures.
//!
//! A planet is a seeded height field over a cube-sphere, rasterized as an
//! isometric cube with three lit faces, then dressed with an optional ring,
//! clouds, and an atmosphere glow. Many planets can be packed into a single
//! sprite atlas for instanced rendering.

mod atlas;
mod error;
mod generator;
mod isometric;
mod overlay;
mod palette;
mod params;
mod raster;

pub use atlas::{Atlas, AtlasCache, AtlasEntry, AtlasOptions, MAX_ATLAS_SIDE, SharedAtlasCache, atlas_index_for_seed, build_planet_atlas};
pub use error::PlanetError;
pub use generator::{OrbitParams, PlanetMetadata, PlanetTexture, STYLE_NAME, generate_planet_texture};
pub use isometric::{Biome, IsoLayout};
pub use palette::{Palette, PalettePreset};
pub use params::{GenerationParams, PlanetOptions, RingKind};

pub use orrery_terrain::PlanetSeed;
