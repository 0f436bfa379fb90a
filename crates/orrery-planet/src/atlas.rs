//! Planet sprite atlas: packs many generated planets into one grid image.
//!
//! Cells are filled row-major, cell `i` at column `i % grid` and row
//! `i / grid`, where `grid = ceil(sqrt(count))`. Each cell holds the planet
//! generated from seed `base_seed + i·37`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use glam::Vec2;
use image::{ImageFormat, RgbaImage};
use orrery_terrain::PlanetSeed;

use crate::error::PlanetError;
use crate::generator::{OrbitParams, generate_planet_texture};
use crate::palette::PalettePreset;
use crate::params::{PlanetOptions, RingKind, SIZE_DEFAULT, SIZE_RANGE};

/// Seed stride between adjacent cells.
pub const CELL_SEED_STRIDE: i64 = 37;
const MAX_CELLS: u32 = 1024;
/// Largest atlas edge in pixels; the default wgpu 2D texture limit.
pub const MAX_ATLAS_SIDE: u32 = 8192;

fn grid_for(count: u32) -> u32 {
    let mut grid = 1;
    while grid * grid < count {
        grid += 1;
    }
    grid
}

// ---------------------------------------------------------------------------
// AtlasOptions
// ---------------------------------------------------------------------------

/// Inputs to [`build_planet_atlas`]; also the [`AtlasCache`] key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtlasOptions {
    /// Number of planets, clamped to `1..=1024`.
    pub count: u32,
    /// Edge length of each cell in pixels, clamped like a planet size.
    pub cell_size: u32,
    pub base_seed: i64,
    /// Palette shared by every cell; `None` lets each seed pick its own.
    pub palette: Option<PalettePreset>,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            count: 16,
            cell_size: SIZE_DEFAULT,
            base_seed: 1000,
            palette: None,
        }
    }
}

impl AtlasOptions {
    /// Options with every field clamped to its valid range.
    ///
    /// Large grids shrink `cell_size` so the atlas side stays within
    /// [`MAX_ATLAS_SIDE`].
    #[must_use]
    pub fn normalized(&self) -> Self {
        let count = self.count.clamp(1, MAX_CELLS);
        let max_cell = (MAX_ATLAS_SIDE / grid_for(count)).max(SIZE_RANGE.0);
        Self {
            count,
            cell_size: self.cell_size.clamp(SIZE_RANGE.0, SIZE_RANGE.1).min(max_cell),
            ..*self
        }
    }

    /// Smallest square grid holding `count` cells.
    #[must_use]
    pub fn grid(&self) -> u32 {
        grid_for(self.normalized().count)
    }

    /// Planet options for cell `index`.
    #[must_use]
    pub fn cell_options(&self, index: u32) -> PlanetOptions {
        PlanetOptions {
            seed: self.base_seed.saturating_add(i64::from(index) * CELL_SEED_STRIDE),
            size: self.cell_size,
            palette: self.palette,
            ..PlanetOptions::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Atlas
// ---------------------------------------------------------------------------

/// Per-cell record, in cell order.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasEntry {
    pub seed: PlanetSeed,
    pub palette: PalettePreset,
    pub ring_kind: RingKind,
    pub has_clouds: bool,
    pub orbit: OrbitParams,
    /// Cell index, equal to the entry's position.
    pub tex_idx: u32,
}

/// A finished atlas image and its cell metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Atlas {
    pub image: RgbaImage,
    pub grid: u32,
    pub cell_size: u32,
    pub count: u32,
    pub entries: Vec<AtlasEntry>,
}

impl Atlas {
    /// Top-left pixel of cell `index`.
    #[must_use]
    pub fn cell_origin(&self, index: u32) -> (u32, u32) {
        ((index % self.grid) * self.cell_size, (index / self.grid) * self.cell_size)
    }

    /// Copy of one cell's pixels, or `None` past the last entry.
    #[must_use]
    pub fn cell_image(&self, index: u32) -> Option<RgbaImage> {
        if index >= self.count {
            return None;
        }
        let (x, y) = self.cell_origin(index);
        Some(
            image::imageops::crop_imm(&self.image, x, y, self.cell_size, self.cell_size).to_image(),
        )
    }

    /// Returns `(uv_min, uv_max)` for cell `index` in `[0, 1]` texture space.
    #[must_use]
    pub fn tile_uvs(&self, index: u32) -> (Vec2, Vec2) {
        let col = index % self.grid;
        let row = index / self.grid;
        let step = 1.0 / self.grid as f32;
        let min = Vec2::new(col as f32 * step, row as f32 * step);
        (min, min + Vec2::splat(step))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), PlanetError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// Rasterize `count` planets into a square atlas.
///
/// Idempotent: identical options give a byte-identical atlas. Cost is
/// `O(count · cell_size²)`.
pub fn build_planet_atlas(options: &AtlasOptions) -> Atlas {
    let options = options.normalized();
    let grid = options.grid();
    let started = Instant::now();

    let mut image = RgbaImage::new(grid * options.cell_size, grid * options.cell_size);
    let mut entries = Vec::with_capacity(options.count as usize);

    for i in 0..options.count {
        let planet = generate_planet_texture(&options.cell_options(i));
        let x = (i % grid) * options.cell_size;
        let y = (i / grid) * options.cell_size;
        image::imageops::replace(&mut image, &planet.image, i64::from(x), i64::from(y));

        let meta = planet.metadata;
        entries.push(AtlasEntry {
            seed: meta.seed,
            palette: meta.palette,
            ring_kind: meta.ring_kind,
            has_clouds: meta.has_clouds,
            orbit: meta.orbit,
            tex_idx: i,
        });
    }

    tracing::info!(
        count = options.count,
        grid,
        cell_size = options.cell_size,
        base_seed = options.base_seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "built planet atlas"
    );

    Atlas {
        image,
        grid,
        cell_size: options.cell_size,
        count: options.count,
        entries,
    }
}

/// Stable cell assignment for callers with more planets than atlas cells.
#[must_use]
pub fn atlas_index_for_seed(seed: PlanetSeed, atlas_count: u32) -> u32 {
    if atlas_count == 0 {
        return 0;
    }
    (seed.get().wrapping_mul(2_654_435_761) >> 8) % atlas_count
}

// ---------------------------------------------------------------------------
// AtlasCache
// ---------------------------------------------------------------------------

/// Built atlases keyed by their normalized options.
///
/// Entries are never evicted; the key space is bounded by the handful of
/// palette and size combinations a scene asks for. Call [`clear`](Self::clear)
/// to release everything.
#[derive(Debug, Default)]
pub struct AtlasCache {
    atlases: HashMap<AtlasOptions, Arc<Atlas>>,
}

/// An [`AtlasCache`] shared between a scene and its background builders.
pub type SharedAtlasCache = Arc<Mutex<AtlasCache>>;

impl AtlasCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> SharedAtlasCache {
        Arc::new(Mutex::new(Self::new()))
    }

    #[must_use]
    pub fn get(&self, options: &AtlasOptions) -> Option<Arc<Atlas>> {
        self.atlases.get(&options.normalized()).cloned()
    }

    /// Store `atlas` under `options`, keeping an existing entry if present.
    pub fn insert(&mut self, options: &AtlasOptions, atlas: Atlas) -> Arc<Atlas> {
        self.atlases
            .entry(options.normalized())
            .or_insert_with(|| Arc::new(atlas))
            .clone()
    }

    /// Cached atlas for `options`, building it on a miss.
    pub fn get_or_build(&mut self, options: &AtlasOptions) -> Arc<Atlas> {
        if let Some(atlas) = self.get(options) {
            return atlas;
        }
        let atlas = build_planet_atlas(options);
        self.insert(options, atlas)
    }

    /// Like [`get_or_build`](Self::get_or_build) on a shared cache, but builds
    /// without holding the lock.
    pub fn fetch_shared(cache: &SharedAtlasCache, options: &AtlasOptions) -> Result<Arc<Atlas>, PlanetError> {
        if let Some(atlas) = cache.lock().map_err(|_| PlanetError::CachePoisoned)?.get(options) {
            tracing::debug!(count = options.count, "atlas cache hit");
            return Ok(atlas);
        }
        let atlas = build_planet_atlas(options);
        let mut guard = cache.lock().map_err(|_| PlanetError::CachePoisoned)?;
        Ok(guard.insert(options, atlas))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    pub fn clear(&mut self) {
        self.atlases.clear();
    }
}
