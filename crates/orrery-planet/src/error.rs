use thiserror::Error;

/// Errors from exporting planet images or sharing atlases.
#[derive(Debug, Error)]
pub enum PlanetError {
    /// PNG encoding or file output failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Another thread panicked while holding the shared atlas cache.
    #[error("atlas cache lock poisoned")]
    CachePoisoned,
}
