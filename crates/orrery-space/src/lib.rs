//! The galaxy view: thousands of planet sprites drawn from one atlas over a
//! procedural starfield, with a pan/zoom camera.

pub mod atlas_job;
pub mod placement;
pub mod scene;
pub mod sprite;
pub mod starfield;

pub use atlas_job::AtlasJob;
pub use placement::{SceneObject, scatter_objects};
pub use scene::{GalaxyScene, GalaxySettings, GalaxyState, MAX_FRAME_DT, SceneError, SceneInput};
pub use sprite::{BatchState, InstanceBatch, SpriteInstance, SpriteRenderer, SpriteUniforms};
pub use starfield::{StarfieldBackground, StarfieldUniforms};
