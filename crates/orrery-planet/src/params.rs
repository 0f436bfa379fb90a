//! Caller-facing planet options and their validated form.

use std::f64::consts::TAU;

use orrery_terrain::{Fbm, HeightFieldParams, Mulberry32, PlanetSeed};
use serde::{Deserialize, Serialize};

use crate::palette::PalettePreset;

// Defaults and clamp ranges for every option.
pub(crate) const SIZE_DEFAULT: u32 = 64;
pub(crate) const SIZE_RANGE: (u32, u32) = (16, 512);
const SCALE_DEFAULT: f64 = 2.2;
const SCALE_RANGE: (f64, f64) = (0.5, 8.0);
const OCTAVES_DEFAULT: u32 = 5;
const OCTAVES_RANGE: (u32, u32) = (3, 7);
const PERSISTENCE_DEFAULT: f64 = 0.5;
const PERSISTENCE_RANGE: (f64, f64) = (0.2, 0.8);
const LACUNARITY_DEFAULT: f64 = 2.0;
const LACUNARITY_RANGE: (f64, f64) = (1.5, 3.0);
const SEA_LEVEL_DEFAULT: f64 = 0.5;
const SEA_LEVEL_RANGE: (f64, f64) = (0.15, 0.85);
const CLOUD_DENSITY_DEFAULT: f64 = 50.0;
const ATMOSPHERE_DEFAULT: f64 = 40.0;
const PERCENT_RANGE: (f64, f64) = (0.0, 100.0);
const RESOLUTION_RANGE: (u32, u32) = (4, 64);

/// Ring system drawn around a planet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RingKind {
    #[default]
    None,
    Thin,
    Wide,
}

impl RingKind {
    /// Map a uniform roll in `[0, 1)` to a ring kind: 15% wide, 15% thin.
    #[must_use]
    pub fn from_roll(roll: f64) -> Self {
        if roll > 0.85 {
            RingKind::Wide
        } else if roll > 0.7 {
            RingKind::Thin
        } else {
            RingKind::None
        }
    }

    /// Band width as a fraction of the body radius.
    #[must_use]
    pub fn width_factor(self) -> f64 {
        match self {
            RingKind::None => 0.0,
            RingKind::Thin => 0.24,
            RingKind::Wide => 0.44,
        }
    }

    #[must_use]
    pub fn is_present(self) -> bool {
        self != RingKind::None
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RingKind::None => "none",
            RingKind::Thin => "thin",
            RingKind::Wide => "wide",
        }
    }
}

impl From<String> for RingKind {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "thin" => RingKind::Thin,
            "wide" => RingKind::Wide,
            _ => RingKind::None,
        }
    }
}

impl From<RingKind> for String {
    fn from(kind: RingKind) -> Self {
        kind.name().to_string()
    }
}

/// Options accepted by [`generate_planet_texture`](crate::generate_planet_texture).
///
/// This is also the shape callers persist, so it deserializes from camelCase
/// JSON such as `{"seed": 42, "palette": "ice", "seaLevel": 0.4}`. Missing
/// fields take their defaults, unknown fields are ignored, and out-of-range
/// values are clamped by [`GenerationParams::resolve`]. Integer fields also
/// take fractional or negative numbers, floored and saturated.
///
/// | field | default | range |
/// |---|---|---|
/// | `seed` | 1 | any integer, normalized |
/// | `size` | 64 | 16..=512 |
/// | `palette` | chosen by seed | unknown names → earth |
/// | `scale` | 2.2 | 0.5..=8.0 |
/// | `octaves` | 5 | 3..=7 |
/// | `persistence` | 0.5 | 0.2..=0.8 |
/// | `lacunarity` | 2.0 | 1.5..=3.0 |
/// | `seaLevel` | 0.5 | 0.15..=0.85 |
/// | `hasClouds` | seeded roll | |
/// | `cloudDensity` | 50 | 0..=100 |
/// | `atmosphere` | 40 | 0..=100 |
/// | `ringType` | seeded roll | none, thin, wide |
/// | `rotation` | 0 | wrapped to 0..2π |
/// | `resolution` | size / 4 | 4..=64 |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanetOptions {
    #[serde(deserialize_with = "lenient::seed")]
    pub seed: i64,
    #[serde(deserialize_with = "lenient::count")]
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<PalettePreset>,
    pub scale: f64,
    #[serde(deserialize_with = "lenient::count")]
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub sea_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_clouds: Option<bool>,
    pub cloud_density: f64,
    pub atmosphere: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring_type: Option<RingKind>,
    pub rotation: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_count"
    )]
    pub resolution: Option<u32>,
}

impl Default for PlanetOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            size: SIZE_DEFAULT,
            palette: None,
            scale: SCALE_DEFAULT,
            octaves: OCTAVES_DEFAULT,
            persistence: PERSISTENCE_DEFAULT,
            lacunarity: LACUNARITY_DEFAULT,
            sea_level: SEA_LEVEL_DEFAULT,
            has_clouds: None,
            cloud_density: CLOUD_DENSITY_DEFAULT,
            atmosphere: ATMOSPHERE_DEFAULT,
            ring_type: None,
            rotation: 0.0,
            resolution: None,
        }
    }
}

impl PlanetOptions {
    /// Default options for one seed.
    #[must_use]
    pub fn for_seed(seed: i64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: PalettePreset) -> Self {
        self.palette = Some(palette);
        self
    }
}

/// Fully resolved generation parameters: clamped, palette chosen, and the
/// seeded cloud and ring rolls decided.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    pub seed: PlanetSeed,
    pub size: u32,
    pub palette: PalettePreset,
    pub noise_scale: f64,
    pub fbm: Fbm,
    pub sea_level: f64,
    pub has_clouds: bool,
    pub cloud_density: f64,
    pub atmosphere: f64,
    pub ring: RingKind,
    pub rotation: f64,
    pub resolution: u32,
}

impl GenerationParams {
    /// Clamp `options` and decide the seeded rolls.
    ///
    /// Both rolls are always drawn from `rng`, even when the caller overrides
    /// them, so later draws from the same stream do not depend on overrides.
    pub fn resolve(options: &PlanetOptions, rng: &mut Mulberry32) -> Self {
        let seed = PlanetSeed::new(options.seed);
        let clouds_roll = rng.next_f64();
        let ring_roll = rng.next_f64();

        let size = options.size.clamp(SIZE_RANGE.0, SIZE_RANGE.1);
        let resolution = options
            .resolution
            .unwrap_or(size / 4)
            .clamp(RESOLUTION_RANGE.0, RESOLUTION_RANGE.1);

        Self {
            seed,
            size,
            palette: options
                .palette
                .unwrap_or_else(|| PalettePreset::for_seed(seed)),
            noise_scale: clamp_finite(options.scale, SCALE_RANGE, SCALE_DEFAULT),
            fbm: Fbm {
                octaves: options.octaves.clamp(OCTAVES_RANGE.0, OCTAVES_RANGE.1),
                persistence: clamp_finite(options.persistence, PERSISTENCE_RANGE, PERSISTENCE_DEFAULT),
                lacunarity: clamp_finite(options.lacunarity, LACUNARITY_RANGE, LACUNARITY_DEFAULT),
            },
            sea_level: clamp_finite(options.sea_level, SEA_LEVEL_RANGE, SEA_LEVEL_DEFAULT),
            has_clouds: options.has_clouds.unwrap_or(clouds_roll > 0.5),
            cloud_density: clamp_finite(options.cloud_density, PERCENT_RANGE, CLOUD_DENSITY_DEFAULT),
            atmosphere: clamp_finite(options.atmosphere, PERCENT_RANGE, ATMOSPHERE_DEFAULT),
            ring: options.ring_type.unwrap_or(RingKind::from_roll(ring_roll)),
            rotation: wrap_rotation(options.rotation),
            resolution,
        }
    }

    #[must_use]
    pub fn height_field_params(&self) -> HeightFieldParams {
        HeightFieldParams {
            resolution: self.resolution,
            noise_scale: self.noise_scale,
            fbm: self.fbm,
            rotation: self.rotation,
        }
    }

    /// Options that pin every resolved choice, so regenerating from them
    /// reproduces the same pixels.
    #[must_use]
    pub fn to_options(&self) -> PlanetOptions {
        PlanetOptions {
            seed: i64::from(self.seed),
            size: self.size,
            palette: Some(self.palette),
            scale: self.noise_scale,
            octaves: self.fbm.octaves,
            persistence: self.fbm.persistence,
            lacunarity: self.fbm.lacunarity,
            sea_level: self.sea_level,
            has_clouds: Some(self.has_clouds),
            cloud_density: self.cloud_density,
            atmosphere: self.atmosphere,
            ring_type: Some(self.ring),
            rotation: self.rotation,
            resolution: Some(self.resolution),
        }
    }
}

/// Integer fields that accept any JSON number. Fractions are floored and
/// values outside the integer type saturate; the range clamps in
/// [`GenerationParams::resolve`] do the rest.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    impl Number {
        fn to_i64(self) -> Option<i64> {
            match self {
                Self::Int(value) => Some(value),
                Self::Float(value) if value.is_finite() => Some(value.floor() as i64),
                Self::Float(_) => None,
            }
        }

        fn to_u32(self) -> u32 {
            self.to_i64()
                .map_or(0, |value| value.clamp(0, i64::from(u32::MAX)) as u32)
        }
    }

    pub fn seed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(Number::deserialize(deserializer)?.to_i64().unwrap_or(1))
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(Number::deserialize(deserializer)?.to_u32())
    }

    pub fn optional_count<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        Ok(Option::<Number>::deserialize(deserializer)?.map(Number::to_u32))
    }
}

/// Wrap into `[0, TAU)`. `rem_euclid` rounds tiny negatives up to `TAU`.
fn wrap_rotation(rotation: f64) -> f64 {
    if !rotation.is_finite() {
        return 0.0;
    }
    let wrapped = rotation.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

fn clamp_finite(value: f64, (lo, hi): (f64, f64), default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(options: &PlanetOptions) -> GenerationParams {
        let mut rng = Mulberry32::new(PlanetSeed::new(options.seed));
        GenerationParams::resolve(options, &mut rng)
    }

    #[test]
    fn test_defaults_are_in_range() {
        let p = resolve(&PlanetOptions::default());
        assert_eq!(p.size, 64);
        assert_eq!(p.resolution, 16);
        assert_eq!(p.fbm.octaves, 5);
        assert_eq!(p.sea_level, 0.5);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let options = PlanetOptions {
            size: 4096,
            octaves: 40,
            sea_level: 0.99,
            scale: -3.0,
            persistence: 9.0,
            lacunarity: 0.0,
            cloud_density: 250.0,
            atmosphere: -1.0,
            resolution: Some(1),
            ..PlanetOptions::default()
        };
        let p = resolve(&options);
        assert_eq!(p.size, 512);
        assert_eq!(p.fbm.octaves, 7);
        assert_eq!(p.sea_level, 0.85);
        assert_eq!(p.noise_scale, 0.5);
        assert_eq!(p.fbm.persistence, 0.8);
        assert_eq!(p.fbm.lacunarity, 1.5);
        assert_eq!(p.cloud_density, 100.0);
        assert_eq!(p.atmosphere, 0.0);
        assert_eq!(p.resolution, 4);

        let low = resolve(&PlanetOptions {
            octaves: 0,
            sea_level: 0.0,
            size: 0,
            ..PlanetOptions::default()
        });
        assert_eq!(low.fbm.octaves, 3);
        assert_eq!(low.sea_level, 0.15);
        assert_eq!(low.size, 16);
    }

    #[test]
    fn test_non_finite_values_take_defaults() {
        let p = resolve(&PlanetOptions {
            scale: f64::NAN,
            sea_level: f64::INFINITY,
            rotation: f64::NEG_INFINITY,
            ..PlanetOptions::default()
        });
        assert_eq!(p.noise_scale, 2.2);
        assert_eq!(p.sea_level, 0.5);
        assert_eq!(p.rotation, 0.0);
    }

    #[test]
    fn test_rotation_wraps() {
        let p = resolve(&PlanetOptions {
            rotation: -0.5,
            ..PlanetOptions::default()
        });
        assert!((p.rotation - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_negative_rotation_stays_below_tau() {
        for rotation in [-1e-17, -f64::MIN_POSITIVE, -TAU, TAU] {
            let p = resolve(&PlanetOptions {
                rotation,
                ..PlanetOptions::default()
            });
            assert!((0.0..TAU).contains(&p.rotation), "{rotation} -> {}", p.rotation);
        }
        assert_eq!(wrap_rotation(-1e-17), 0.0);
    }

    #[test]
    fn test_palette_defaults_to_seed_choice() {
        let p = resolve(&PlanetOptions::for_seed(1002));
        assert_eq!(p.palette, PalettePreset::Ice);
        let q = resolve(&PlanetOptions::for_seed(1002).with_palette(PalettePreset::Lava));
        assert_eq!(q.palette, PalettePreset::Lava);
    }

    #[test]
    fn test_overrides_do_not_shift_the_stream() {
        let base = PlanetOptions::for_seed(555);
        let mut rng_a = Mulberry32::new(PlanetSeed::new(555));
        let mut rng_b = Mulberry32::new(PlanetSeed::new(555));
        let _ = GenerationParams::resolve(&base, &mut rng_a);
        let overridden = PlanetOptions {
            has_clouds: Some(true),
            ring_type: Some(RingKind::Wide),
            ..base
        };
        let p = GenerationParams::resolve(&overridden, &mut rng_b);
        assert!(p.has_clouds);
        assert_eq!(p.ring, RingKind::Wide);
        assert_eq!(rng_a, rng_b);
    }

    #[test]
    fn test_ring_roll_thresholds() {
        assert_eq!(RingKind::from_roll(0.1), RingKind::None);
        assert_eq!(RingKind::from_roll(0.75), RingKind::Thin);
        assert_eq!(RingKind::from_roll(0.9), RingKind::Wide);
    }

    #[test]
    fn test_exported_shape_deserializes() {
        let json = r#"{
            "seed": 4242,
            "palette": "toxic",
            "scale": 3.5,
            "octaves": 6,
            "seaLevel": 0.42,
            "cloudDensity": 70,
            "atmosphere": 25,
            "ringType": "thin",
            "rotation": 0.3,
            "createdAt": "ignored"
        }"#;
        let options: PlanetOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.seed, 4242);
        assert_eq!(options.palette, Some(PalettePreset::Dark));
        assert_eq!(options.scale, 3.5);
        assert_eq!(options.octaves, 6);
        assert_eq!(options.sea_level, 0.42);
        assert_eq!(options.cloud_density, 70.0);
        assert_eq!(options.atmosphere, 25.0);
        assert_eq!(options.ring_type, Some(RingKind::Thin));
        assert_eq!(options.rotation, 0.3);
        assert_eq!(options.size, 64);
    }

    #[test]
    fn test_hand_written_numbers_are_coerced() {
        let json = r#"{"seed": 42.5, "size": -5, "octaves": 5.5, "resolution": 12.9}"#;
        let options: PlanetOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.seed, 42);
        assert_eq!(options.size, 0);
        assert_eq!(options.octaves, 5);
        assert_eq!(options.resolution, Some(12));

        let p = resolve(&options);
        assert_eq!(p.size, 16);
        assert_eq!(p.fbm.octaves, 5);

        let huge: PlanetOptions =
            serde_json::from_str(r#"{"seed": -7.2, "size": 1e12, "resolution": null}"#).unwrap();
        assert_eq!(huge.seed, -8);
        assert_eq!(huge.size, u32::MAX);
        assert_eq!(huge.resolution, None);
        assert_eq!(resolve(&huge).size, 512);

        assert!(serde_json::from_str::<PlanetOptions>(r#"{"size": "big"}"#).is_err());
    }

    #[test]
    fn test_pinned_options_survive_json() {
        let p = resolve(&PlanetOptions::for_seed(31337));
        let json = serde_json::to_string(&p.to_options()).unwrap();
        assert!(json.contains("\"seaLevel\""));
        assert!(json.contains("\"ringType\""));
        let back: PlanetOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(resolve(&back), p);
    }

    #[test]
    fn test_unknown_ring_type_is_none() {
        let options: PlanetOptions = serde_json::from_str(r#"{"ringType": "triple"}"#).unwrap();
        assert_eq!(options.ring_type, Some(RingKind::None));
    }
}
