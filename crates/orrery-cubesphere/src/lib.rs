//! Cube-sphere geometry: the six face bases and the cube-to-sphere projection
//! used to sample planet height fields without polar pinching.

mod cube_face;
mod projection;

pub use cube_face::CubeFace;
pub use projection::{cube_to_sphere_everitt, face_uv_to_cube_point, face_uv_to_sphere, texel_center};
