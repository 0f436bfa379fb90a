//! Seeded noise and cube-sphere height fields for procedural planets.
//!
//! Everything here is pure integer or IEEE arithmetic, so a given seed yields
//! bit-identical output on every run.

mod height_field;
mod noise;
mod seed;

pub use height_field::{HeightField, HeightFieldParams};
pub use noise::{Fbm, ValueNoise};
pub use seed::{Mulberry32, PlanetSeed, SEED_MODULUS, det_atan2, det_cos, det_sin, det_sqrt};
