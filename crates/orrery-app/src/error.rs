//! Application-level errors. Every variant is fatal: `main` logs it and
//! exits non-zero.

use std::path::PathBuf;

use orrery_config::ConfigError;
use orrery_planet::PlanetError;
use orrery_render::{RenderContextError, SurfaceError};
use orrery_space::SceneError;

use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read options from {}: {source}", path.display())]
    OptionsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid planet options in {}: {source}", path.display())]
    OptionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Planet(#[from] PlanetError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("GPU initialization failed: {0}")]
    Render(#[from] RenderContextError),

    #[error("scene setup failed: {0}")]
    Scene(#[from] SceneError),

    #[error("frame acquisition failed: {0}")]
    Surface(#[from] SurfaceError),
}
