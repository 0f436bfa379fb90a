//! Named colour palettes for planet biomes.

use image::Rgb;
use orrery_terrain::PlanetSeed;
use serde::{Deserialize, Serialize};

/// Biome colours plus the overlay tints used by one planet type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub ocean_dark: Rgb<u8>,
    pub ocean_light: Rgb<u8>,
    pub land_dark: Rgb<u8>,
    pub land_light: Rgb<u8>,
    pub highlight: Rgb<u8>,
    pub atmosphere: Rgb<u8>,
    pub ring: Rgb<u8>,
}

const EARTH: Palette = Palette {
    ocean_dark: Rgb([0x1d, 0x3f, 0x66]),
    ocean_light: Rgb([0x2f, 0x6a, 0xa3]),
    land_dark: Rgb([0x3f, 0x6c, 0x2f]),
    land_light: Rgb([0x6e, 0xa2, 0x4c]),
    highlight: Rgb([0xc7, 0xe7, 0xff]),
    atmosphere: Rgb([125, 176, 255]),
    ring: Rgb([183, 198, 230]),
};

const LAVA: Palette = Palette {
    ocean_dark: Rgb([0x3b, 0x0f, 0x08]),
    ocean_light: Rgb([0x6f, 0x1f, 0x12]),
    land_dark: Rgb([0x8f, 0x2e, 0x10]),
    land_light: Rgb([0xde, 0x65, 0x23]),
    highlight: Rgb([0xff, 0xd2, 0x7f]),
    atmosphere: Rgb([255, 108, 26]),
    ring: Rgb([255, 126, 51]),
};

const ICE: Palette = Palette {
    ocean_dark: Rgb([0x42, 0x69, 0x86]),
    ocean_light: Rgb([0x75, 0xa7, 0xcc]),
    land_dark: Rgb([0xb9, 0xdf, 0xf3]),
    land_light: Rgb([0xf1, 0xfb, 0xff]),
    highlight: Rgb([0xff, 0xff, 0xff]),
    atmosphere: Rgb([177, 225, 255]),
    ring: Rgb([182, 220, 255]),
};

const DESERT: Palette = Palette {
    ocean_dark: Rgb([0x6e, 0x4f, 0x2e]),
    ocean_light: Rgb([0x94, 0x70, 0x43]),
    land_dark: Rgb([0xbb, 0x8f, 0x45]),
    land_light: Rgb([0xe0, 0xb8, 0x6f]),
    highlight: Rgb([0xff, 0xf1, 0xc9]),
    atmosphere: Rgb([255, 214, 150]),
    ring: Rgb([224, 190, 140]),
};

const DARK: Palette = Palette {
    ocean_dark: Rgb([0x19, 0x12, 0x2b]),
    ocean_light: Rgb([0x2d, 0x1f, 0x47]),
    land_dark: Rgb([0x4d, 0x2e, 0x73]),
    land_light: Rgb([0x6a, 0x42, 0x99]),
    highlight: Rgb([0xe2, 0xd5, 0xff]),
    atmosphere: Rgb([170, 130, 255]),
    ring: Rgb([190, 170, 230]),
};

/// The built-in planet types.
///
/// Names are matched case-insensitively; `toxic` is an alias of `dark` and any
/// other unknown name resolves to [`PalettePreset::Earth`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PalettePreset {
    #[default]
    Earth,
    Lava,
    Ice,
    Desert,
    Dark,
}

impl PalettePreset {
    pub const ALL: [PalettePreset; 5] = [
        PalettePreset::Earth,
        PalettePreset::Lava,
        PalettePreset::Ice,
        PalettePreset::Desert,
        PalettePreset::Dark,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PalettePreset::Earth => "earth",
            PalettePreset::Lava => "lava",
            PalettePreset::Ice => "ice",
            PalettePreset::Desert => "desert",
            PalettePreset::Dark => "dark",
        }
    }

    /// Look up a preset by name. Returns `None` for unknown names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "earth" => Some(PalettePreset::Earth),
            "lava" => Some(PalettePreset::Lava),
            "ice" => Some(PalettePreset::Ice),
            "desert" => Some(PalettePreset::Desert),
            "dark" | "toxic" => Some(PalettePreset::Dark),
            _ => None,
        }
    }

    /// Look up a preset by name, falling back to the default for unknown names.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// The preset a seed picks when the caller does not name one.
    #[must_use]
    pub fn for_seed(seed: PlanetSeed) -> Self {
        Self::ALL[(seed.get() % Self::ALL.len() as u32) as usize]
    }

    #[must_use]
    pub fn palette(self) -> &'static Palette {
        match self {
            PalettePreset::Earth => &EARTH,
            PalettePreset::Lava => &LAVA,
            PalettePreset::Ice => &ICE,
            PalettePreset::Desert => &DESERT,
            PalettePreset::Dark => &DARK,
        }
    }
}

impl From<String> for PalettePreset {
    fn from(name: String) -> Self {
        Self::from_name_or_default(&name)
    }
}

impl From<PalettePreset> for String {
    fn from(preset: PalettePreset) -> Self {
        preset.name().to_string()
    }
}

impl std::fmt::Display for PalettePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(PalettePreset::from_name("LAVA"), Some(PalettePreset::Lava));
        assert_eq!(PalettePreset::from_name(" ice "), Some(PalettePreset::Ice));
    }

    #[test]
    fn test_toxic_is_alias_of_dark() {
        assert_eq!(PalettePreset::from_name("toxic"), Some(PalettePreset::Dark));
    }

    #[test]
    fn test_unknown_name_falls_back_to_earth() {
        assert_eq!(PalettePreset::from_name("plaid"), None);
        assert_eq!(PalettePreset::from_name_or_default("plaid"), PalettePreset::Earth);
    }

    #[test]
    fn test_name_round_trips() {
        for preset in PalettePreset::ALL {
            assert_eq!(PalettePreset::from_name(preset.name()), Some(preset));
        }
    }

    #[test]
    fn test_seed_selects_by_modulo() {
        assert_eq!(PalettePreset::for_seed(PlanetSeed::new(1000)), PalettePreset::Earth);
        assert_eq!(PalettePreset::for_seed(PlanetSeed::new(1001)), PalettePreset::Lava);
        assert_eq!(PalettePreset::for_seed(PlanetSeed::new(1004)), PalettePreset::Dark);
    }

    #[test]
    fn test_serde_uses_names_with_fallback() {
        let json = serde_json::to_string(&PalettePreset::Desert).unwrap();
        assert_eq!(json, "\"desert\"");
        let parsed: PalettePreset = serde_json::from_str("\"Toxic\"").unwrap();
        assert_eq!(parsed, PalettePreset::Dark);
        let unknown: PalettePreset = serde_json::from_str("\"nope\"").unwrap();
        assert_eq!(unknown, PalettePreset::Earth);
    }

    #[test]
    fn test_palettes_are_distinct() {
        for a in PalettePreset::ALL {
            for b in PalettePreset::ALL {
                if a != b {
                    assert_ne!(a.palette(), b.palette());
                }
            }
        }
    }
}
