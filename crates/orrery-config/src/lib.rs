//! Configuration for Orrery.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section defaults independently, so older or partial
//! files keep loading.

mod cli;
mod config;
mod error;

pub use cli::{AtlasArgs, CliArgs, Command, PlanetArgs};
pub use config::{
    AtlasConfig, CONFIG_FILE_NAME, CameraConfig, Config, DebugConfig, GalaxyConfig, WindowConfig,
};
pub use error::ConfigError;
