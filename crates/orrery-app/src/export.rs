//! The `planet` and `atlas` subcommands: render to PNG without a window.

use std::path::Path;

use orrery_config::{AtlasArgs, PlanetArgs};
use orrery_planet::{
    Atlas, AtlasOptions, PalettePreset, PlanetOptions, PlanetTexture, build_planet_atlas,
    generate_planet_texture,
};
use tracing::info;

use crate::AppError;

/// Read generation options from a JSON file in the exported shape.
pub fn load_options(path: &Path) -> Result<PlanetOptions, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::OptionsRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| AppError::OptionsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Combine the `--options` file with the explicit flags; flags win.
pub fn planet_options(args: &PlanetArgs) -> Result<PlanetOptions, AppError> {
    let mut options = match &args.options {
        Some(path) => load_options(path)?,
        None => PlanetOptions::default(),
    };
    if let Some(seed) = args.seed {
        options.seed = seed;
    }
    if let Some(size) = args.size {
        options.size = size;
    }
    if let Some(name) = &args.palette {
        options.palette = Some(PalettePreset::from_name_or_default(name));
    }
    Ok(options)
}

pub fn atlas_options(args: &AtlasArgs) -> AtlasOptions {
    AtlasOptions {
        count: args.count,
        cell_size: args.cell_size,
        base_seed: args.base_seed,
        palette: args.palette.as_deref().map(PalettePreset::from_name_or_default),
    }
}

/// Generate one planet and write it to `args.out`.
pub fn export_planet(args: &PlanetArgs) -> Result<PlanetTexture, AppError> {
    let options = planet_options(args)?;
    let texture = generate_planet_texture(&options);
    texture.save_png(&args.out)?;
    info!(
        seed = texture.metadata.seed.get(),
        palette = %texture.metadata.palette,
        ring = texture.metadata.ring_kind.name(),
        size = texture.image.width(),
        "Wrote planet to {}",
        args.out.display()
    );
    Ok(texture)
}

/// Build an atlas and write it to `args.out`.
pub fn export_atlas(args: &AtlasArgs) -> Result<Atlas, AppError> {
    let atlas = build_planet_atlas(&atlas_options(args));
    atlas.save_png(&args.out)?;
    info!(
        count = atlas.count,
        grid = atlas.grid,
        cell_size = atlas.cell_size,
        "Wrote atlas to {}",
        args.out.display()
    );
    Ok(atlas)
}
