//! The orrery application: the galaxy window and the PNG export commands.

pub mod error;
pub mod export;
pub mod frame_clock;
pub mod input;
pub mod platform;
pub mod window;

pub use error::AppError;
