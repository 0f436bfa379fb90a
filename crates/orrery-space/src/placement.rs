//! Deterministic scattering of planets across the galaxy disc.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// One planet sprite in the galaxy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObject {
    pub x: f32,
    pub y: f32,
    /// Edge length in world units, in `[8, 28)`.
    pub size: f32,
    /// Radians.
    pub rotation: f32,
    /// Radians per second, in `[-0.3, 0.3)`.
    pub rotation_speed: f32,
    pub atlas_index: u32,
}

impl SceneObject {
    /// Advance the spin by `dt` seconds, keeping the angle in `[0, 2π)`.
    pub fn spin(&mut self, dt: f32) {
        self.rotation = (self.rotation + self.rotation_speed * dt).rem_euclid(TAU);
    }
}

/// Scatter `count` objects uniformly over a disc of `world_radius` around the
/// origin. Identical arguments always give identical objects.
pub fn scatter_objects(count: usize, world_radius: f32, seed: u64, atlas_count: u32) -> Vec<SceneObject> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let atlas_count = atlas_count.max(1);
    let world_radius = if world_radius.is_finite() { world_radius.abs() } else { 0.0 };

    (0..count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            // sqrt keeps the density uniform over the disc's area.
            let radius = rng.random::<f32>().sqrt() * world_radius;
            SceneObject {
                x: angle.cos() * radius,
                y: angle.sin() * radius,
                size: 8.0 + rng.random::<f32>() * 20.0,
                rotation: rng.random::<f32>() * TAU,
                rotation_speed: (rng.random::<f32>() - 0.5) * 0.6,
                atlas_index: rng.random_range(0..atlas_count),
            }
        })
        .collect()
}
