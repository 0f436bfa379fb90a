//! Cube-to-sphere projection.
//!
//! Face coordinates live in `[-1, 1]²`. A face point is first placed on the
//! surface of the `[-1, 1]` cube and then inflated to the unit sphere with the
//! Everitt mapping, which keeps texel areas close to uniform.

use glam::DVec3;

use crate::CubeFace;

/// Convert face coordinates to a point on the surface of the `[-1, 1]` cube.
///
/// The face center `(0, 0)` maps to the face normal.
#[inline]
#[must_use]
pub fn face_uv_to_cube_point(face: CubeFace, u: f64, v: f64) -> DVec3 {
    let (normal, u_axis, v_axis) = face.frame();
    normal + u * u_axis + v * v_axis
}

/// Analytic cube-to-sphere using the Everitt/Mathworld mapping.
///
/// ```text
/// sx = x * sqrt(1 - y²/2 - z²/2 + y²z²/3)
/// sy = y * sqrt(1 - x²/2 - z²/2 + x²z²/3)
/// sz = z * sqrt(1 - x²/2 - y²/2 + x²y²/3)
/// ```
#[inline]
#[must_use]
pub fn cube_to_sphere_everitt(cube_point: DVec3) -> DVec3 {
    let x2 = cube_point.x * cube_point.x;
    let y2 = cube_point.y * cube_point.y;
    let z2 = cube_point.z * cube_point.z;

    DVec3::new(
        cube_point.x * (1.0 - y2 / 2.0 - z2 / 2.0 + y2 * z2 / 3.0).sqrt(),
        cube_point.y * (1.0 - x2 / 2.0 - z2 / 2.0 + x2 * z2 / 3.0).sqrt(),
        cube_point.z * (1.0 - x2 / 2.0 - y2 / 2.0 + x2 * y2 / 3.0).sqrt(),
    )
}

/// Face coordinates → unit sphere.
#[inline]
#[must_use]
pub fn face_uv_to_sphere(face: CubeFace, u: f64, v: f64) -> DVec3 {
    cube_to_sphere_everitt(face_uv_to_cube_point(face, u, v))
}

/// Face coordinate of the center of texel `index` on an edge of `resolution`
/// texels.
#[inline]
#[must_use]
pub fn texel_center(index: u32, resolution: u32) -> f64 {
    let n = f64::from(resolution.max(1));
    -1.0 + (f64::from(index) + 0.5) * 2.0 / n
}
