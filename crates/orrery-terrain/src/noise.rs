//! Seeded 3D value noise and fractal Brownian motion.
//!
//! Lattice corners get pseudo-random values in `[-1, 1]` from an integer
//! avalanche hash; samples blend the eight surrounding corners with
//! smoothstep-eased trilinear interpolation. Because every corner value is in
//! `[-1, 1]` and the blend weights are convex, samples never leave that range.

use glam::DVec3;

/// Seed stride between successive fbm octaves.
const OCTAVE_SEED_STRIDE: u32 = 37;

/// Octave configuration for [`ValueNoise::fbm`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fbm {
    /// Number of noise layers. Zero yields a flat `0.0` signal.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
}

impl Default for Fbm {
    fn default() -> Self {
        Self {
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Lattice value noise keyed by a 32-bit seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueNoise {
    seed: u32,
}

impl ValueNoise {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    #[must_use]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Single-octave noise at `p`, in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, p: DVec3) -> f64 {
        sample_seeded(self.seed, p)
    }

    /// Fractal sum of `fbm.octaves` noise layers, normalized by the total
    /// amplitude so the result stays in `[-1, 1]`.
    ///
    /// Each octave uses its own lattice seed (`seed + i·37`) so layers do not
    /// line up at the origin.
    #[must_use]
    pub fn fbm(&self, p: DVec3, fbm: &Fbm) -> f64 {
        if fbm.octaves == 0 {
            return 0.0;
        }

        let mut total = 0.0;
        let mut norm = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for i in 0..fbm.octaves {
            let octave_seed = self.seed.wrapping_add(i.wrapping_mul(OCTAVE_SEED_STRIDE));
            total += amplitude * sample_seeded(octave_seed, p * frequency);
            norm += amplitude;
            amplitude *= fbm.persistence;
            frequency *= fbm.lacunarity;
        }

        if norm <= f64::EPSILON {
            return 0.0;
        }
        (total / norm).clamp(-1.0, 1.0)
    }
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Avalanche hash of a lattice corner, mapped to `[-1, 1]`.
#[inline]
fn lattice_value(seed: u32, x: i32, y: i32, z: i32) -> f64 {
    let mut h = seed.wrapping_mul(0x9E37_79B9)
        ^ (x as u32).wrapping_mul(0x85EB_CA6B)
        ^ (y as u32).wrapping_mul(0xC2B2_AE35)
        ^ (z as u32).wrapping_mul(0x27D4_EB2F);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297A_2D39);
    h ^= h >> 15;
    f64::from(h) / f64::from(u32::MAX) * 2.0 - 1.0
}

fn sample_seeded(seed: u32, p: DVec3) -> f64 {
    let base = p.floor();
    let (x0, y0, z0) = (base.x as i32, base.y as i32, base.z as i32);
    let (x1, y1, z1) = (x0.wrapping_add(1), y0.wrapping_add(1), z0.wrapping_add(1));

    let f = p - base;
    let (u, v, w) = (smoothstep(f.x), smoothstep(f.y), smoothstep(f.z));

    let c000 = lattice_value(seed, x0, y0, z0);
    let c100 = lattice_value(seed, x1, y0, z0);
    let c010 = lattice_value(seed, x0, y1, z0);
    let c110 = lattice_value(seed, x1, y1, z0);
    let c001 = lattice_value(seed, x0, y0, z1);
    let c101 = lattice_value(seed, x1, y0, z1);
    let c011 = lattice_value(seed, x0, y1, z1);
    let c111 = lattice_value(seed, x1, y1, z1);

    let x00 = lerp(c000, c100, u);
    let x10 = lerp(c010, c110, u);
    let x01 = lerp(c001, c101, u);
    let x11 = lerp(c011, c111, u);

    let y0v = lerp(x00, x10, v);
    let y1v = lerp(x01, x11, v);

    lerp(y0v, y1v, w)
}
