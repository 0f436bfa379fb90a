//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub galaxy: GalaxyConfig,
    pub atlas: AtlasConfig,
    pub camera: CameraConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub title: String,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
}

/// Layout of the galaxy view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GalaxyConfig {
    pub object_count: usize,
    /// Radius of the disc objects are scattered over, in world units.
    pub world_radius: f32,
    pub layout_seed: u64,
    /// Instances drawn per frame; visible objects beyond this are dropped.
    pub max_instances: usize,
}

/// The sprite atlas the galaxy draws from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
    pub count: u32,
    /// Cell edge length in pixels.
    pub cell_size: u32,
    pub base_seed: i64,
    /// Palette name shared by every cell, or `None` to pick per seed.
    pub palette: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom multiplier per wheel notch.
    pub zoom_step: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter, e.g. "debug" or "info,orrery_space=trace".
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Orrery".to_string(),
            vsync: true,
        }
    }
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            object_count: 10_000,
            world_radius: 12_000.0,
            layout_seed: 1337,
            max_instances: 10_000,
        }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            count: 16,
            cell_size: 64,
            base_seed: 7000,
            palette: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 8.0,
            zoom_step: 1.1,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save ---

impl Config {
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Load `config.ron` from `config_dir`, writing a default one if missing.
    ///
    /// A file that exists but does not parse is left untouched and the
    /// defaults are used for this run.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path_in(config_dir);

        if config_path.exists() {
            match Self::read(&config_path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    Ok(config)
                }
                Err(ConfigError::Parse { path, source }) => {
                    log::warn!("Ignoring malformed {}: {source}; using defaults", path.display());
                    Ok(Config::default())
                }
                Err(e) => Err(e),
            }
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save as `config.ron` in `config_dir`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = Self::path_in(config_dir);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
