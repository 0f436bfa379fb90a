//! Per-face height maps sampled over the cube-sphere.

use glam::DVec3;
use orrery_cubesphere::{CubeFace, face_uv_to_sphere, texel_center};

use crate::noise::{Fbm, ValueNoise};
use crate::seed::{det_cos, det_sin};

/// Parameters for [`HeightField::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightFieldParams {
    /// Texels per face edge.
    pub resolution: u32,
    /// Multiplier applied to sphere points before sampling noise. Larger
    /// values produce smaller continents.
    pub noise_scale: f64,
    pub fbm: Fbm,
    /// Rotation about the Y axis, in radians, applied before sampling.
    pub rotation: f64,
}

impl Default for HeightFieldParams {
    fn default() -> Self {
        Self {
            resolution: 16,
            noise_scale: 2.2,
            fbm: Fbm::default(),
            rotation: 0.0,
        }
    }
}

/// Six square height maps, one per [`CubeFace`], with values in `[0, 1]`.
///
/// Texel `(i, j)` of a face covers face coordinates around
/// `(texel_center(i), texel_center(j))`; `i` runs along the face tangent and
/// `j` along the bitangent.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    resolution: u32,
    faces: [Vec<f64>; 6],
}

impl HeightField {
    /// Sample every texel of every face.
    #[must_use]
    pub fn build(noise: &ValueNoise, params: &HeightFieldParams) -> Self {
        let resolution = params.resolution.max(1);
        let faces = CubeFace::ALL.map(|face| {
            let mut values = Vec::with_capacity((resolution * resolution) as usize);
            for j in 0..resolution {
                let v = texel_center(j, resolution);
                for i in 0..resolution {
                    let u = texel_center(i, resolution);
                    values.push(Self::height_at(noise, params, face, u, v));
                }
            }
            values
        });
        Self { resolution, faces }
    }

    /// Height at arbitrary face coordinates `(u, v) ∈ [-1, 1]²`.
    ///
    /// Points on a shared cube edge give the same value from either face.
    #[must_use]
    pub fn height_at(
        noise: &ValueNoise,
        params: &HeightFieldParams,
        face: CubeFace,
        u: f64,
        v: f64,
    ) -> f64 {
        let p = rotate_y(face_uv_to_sphere(face, u, v), params.rotation);
        let n = noise.fbm(p * params.noise_scale, &params.fbm);
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Row-major texels of one face.
    #[must_use]
    pub fn face(&self, face: CubeFace) -> &[f64] {
        &self.faces[face.index()]
    }

    /// Texel value with indices clamped to the face.
    #[must_use]
    pub fn get(&self, face: CubeFace, i: i64, j: i64) -> f64 {
        let max = i64::from(self.resolution) - 1;
        let i = i.clamp(0, max) as usize;
        let j = j.clamp(0, max) as usize;
        self.faces[face.index()][j * self.resolution as usize + i]
    }

    /// Iterator over every texel of every face.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.faces.iter().flat_map(|f| f.iter().copied())
    }
}

fn rotate_y(p: DVec3, angle: f64) -> DVec3 {
    if angle == 0.0 {
        return p;
    }
    let (s, c) = (det_sin(angle), det_cos(angle));
    DVec3::new(p.x * c + p.z * s, p.y, -p.x * s + p.z * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(resolution: u32) -> HeightFieldParams {
        HeightFieldParams {
            resolution,
            ..HeightFieldParams::default()
        }
    }

    #[test]
    fn test_build_has_six_square_faces() {
        let field = HeightField::build(&ValueNoise::new(9), &params(8));
        assert_eq!(field.resolution(), 8);
        for face in CubeFace::ALL {
            assert_eq!(field.face(face).len(), 64);
        }
        assert_eq!(field.values().count(), 6 * 64);
    }

    #[test]
    fn test_heights_are_normalized() {
        for seed in [1, 1000, 77_777] {
            let field = HeightField::build(&ValueNoise::new(seed), &params(16));
            for h in field.values() {
                assert!((0.0..=1.0).contains(&h), "height out of range: {h}");
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = HeightField::build(&ValueNoise::new(1000), &params(12));
        let b = HeightField::build(&ValueNoise::new(1000), &params(12));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_edges_agree() {
        let noise = ValueNoise::new(31);
        let p = params(8);
        for k in 0..=10 {
            let t = -1.0 + f64::from(k) * 0.2;
            let top = HeightField::height_at(&noise, &p, CubeFace::Top, t, -1.0);
            let front = HeightField::height_at(&noise, &p, CubeFace::Front, t, 1.0);
            assert!((top - front).abs() < 1e-9, "top/front mismatch at {t}");

            let right = HeightField::height_at(&noise, &p, CubeFace::Right, -1.0, t);
            let front_side = HeightField::height_at(&noise, &p, CubeFace::Front, 1.0, t);
            assert!((right - front_side).abs() < 1e-9, "right/front mismatch at {t}");
        }
    }

    #[test]
    fn test_get_clamps_indices() {
        let field = HeightField::build(&ValueNoise::new(4), &params(4));
        assert_eq!(field.get(CubeFace::Top, -3, 0), field.get(CubeFace::Top, 0, 0));
        assert_eq!(field.get(CubeFace::Top, 99, 99), field.get(CubeFace::Top, 3, 3));
    }

    #[test]
    fn test_rotation_changes_field() {
        let noise = ValueNoise::new(12);
        let still = HeightField::build(&noise, &params(8));
        let turned = HeightField::build(
            &noise,
            &HeightFieldParams {
                rotation: 1.2,
                ..params(8)
            },
        );
        assert_ne!(still, turned);
    }

    #[test]
    fn test_full_turn_is_close_to_identity() {
        let noise = ValueNoise::new(12);
        let p = params(4);
        let turned = HeightFieldParams {
            rotation: std::f64::consts::TAU,
            ..p
        };
        let a = HeightField::height_at(&noise, &p, CubeFace::Front, 0.2, 0.3);
        let b = HeightField::height_at(&noise, &turned, CubeFace::Front, 0.2, 0.3);
        assert!((a - b).abs() < 1e-9);
    }
}
