//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::Config;

/// Orrery command-line arguments.
///
/// Global flags override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "orrery", about = "Procedural pixel planets and the galaxy they live in")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Window width.
    #[arg(long, global = true)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long, global = true)]
    pub height: Option<u32>,

    /// Number of planets scattered across the galaxy.
    #[arg(long, global = true)]
    pub objects: Option<usize>,

    /// Seed for the galaxy layout.
    #[arg(long, global = true)]
    pub layout_seed: Option<u64>,

    /// Log filter (error, warn, info, debug, trace, or a directive list).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the galaxy window (default).
    Galaxy,
    /// Render one planet to a PNG.
    Planet(PlanetArgs),
    /// Render a planet atlas to a PNG.
    Atlas(AtlasArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PlanetArgs {
    /// Planet seed. Overrides the seed in `--options`.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Texture edge length in pixels.
    #[arg(long)]
    pub size: Option<u32>,

    /// Palette name (earth, lava, ice, desert, dark).
    #[arg(long)]
    pub palette: Option<String>,

    /// JSON file with generation options.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AtlasArgs {
    /// Number of planets in the atlas.
    #[arg(long, default_value_t = 16)]
    pub count: u32,

    /// Cell edge length in pixels.
    #[arg(long, default_value_t = 64)]
    pub cell_size: u32,

    /// Seed of the first cell; cell `i` uses `base_seed + i`.
    #[arg(long, default_value_t = 1000, allow_negative_numbers = true)]
    pub base_seed: i64,

    /// Palette shared by every cell.
    #[arg(long)]
    pub palette: Option<String>,

    /// Output PNG path.
    #[arg(long)]
    pub out: PathBuf,
}

impl CliArgs {
    /// The subcommand to run, defaulting to the galaxy window.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Galaxy)
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(n) = args.objects {
            self.galaxy.object_count = n;
        }
        if let Some(seed) = args.layout_seed {
            self.galaxy.layout_seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
