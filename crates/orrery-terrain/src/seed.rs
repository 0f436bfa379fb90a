//! Deterministic seeding utilities.
//!
//! Provides the canonical planet seed normalization, the Mulberry32 generator
//! every stochastic choice is drawn from, and deterministic math via `libm`.

use rand::RngCore;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Seed normalization
// ---------------------------------------------------------------------------

/// Modulus of the canonical seed space.
pub const SEED_MODULUS: i64 = 2_147_483_647;

/// A planet seed, always in `[1, SEED_MODULUS - 1]`.
///
/// Raw seeds are reduced with `raw % SEED_MODULUS` (sign kept) and shifted
/// into range by adding `SEED_MODULUS - 1` when the remainder is not positive.
/// The single raw value that would still land on zero maps to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct PlanetSeed(u32);

impl PlanetSeed {
    /// Normalize an integer seed.
    #[must_use]
    pub fn new(raw: i64) -> Self {
        let mut s = raw % SEED_MODULUS;
        if s <= 0 {
            s += SEED_MODULUS - 1;
        }
        Self(s.max(1) as u32)
    }

    /// Normalize a floating-point seed. Non-finite input maps to seed 1.
    #[must_use]
    pub fn from_f64(raw: f64) -> Self {
        if !raw.is_finite() {
            return Self(1);
        }
        Self::new(libm::floor(raw) as i64)
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Seed offset by `stride · index`, normalized again.
    #[must_use]
    pub fn offset(self, index: u32, stride: i64) -> Self {
        Self::new(i64::from(self.0) + i64::from(index) * stride)
    }
}

impl Default for PlanetSeed {
    fn default() -> Self {
        Self(1)
    }
}

impl From<i64> for PlanetSeed {
    fn from(raw: i64) -> Self {
        Self::new(raw)
    }
}

impl From<PlanetSeed> for i64 {
    fn from(seed: PlanetSeed) -> Self {
        i64::from(seed.0)
    }
}

impl std::fmt::Display for PlanetSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Mulberry32
// ---------------------------------------------------------------------------

/// Mulberry32: a 32-bit state generator built only from wrapping integer ops.
///
/// The stream for a given seed is identical on every platform, which makes it
/// suitable for content that must regenerate byte-for-byte from a stored seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub fn new(seed: PlanetSeed) -> Self {
        Self { state: seed.get() }
    }

    /// Start from a raw 32-bit state, bypassing seed normalization.
    #[must_use]
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Next value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Next value in `[lo, hi)`.
    #[inline]
    pub fn next_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}

impl RngCore for Mulberry32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        rand::rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dst);
    }
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f64) -> f64 {
    libm::cos(x)
}

/// Deterministic atan2 using libm.
#[inline]
pub fn det_atan2(y: f64, x: f64) -> f64 {
    libm::atan2(y, x)
}

/// Deterministic sqrt using libm.
#[inline]
pub fn det_sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}
