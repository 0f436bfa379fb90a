//! Cube faces and their surface frames.

use glam::DVec3;

/// A face of the `[-1, 1]` cube, named for the axis its outward normal
/// points along: `Right` is +X, `Top` is +Y, `Front` is +Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Right,
    Left,
    Top,
    Bottom,
    Front,
    Back,
}

/// `[normal, u axis, v axis]` per face, in [`CubeFace::ALL`] order. Faces
/// meeting at an edge agree on the 3D points along it.
const FRAMES: [[DVec3; 3]; 6] = [
    [DVec3::X, DVec3::NEG_Z, DVec3::Y],
    [DVec3::NEG_X, DVec3::Z, DVec3::Y],
    [DVec3::Y, DVec3::X, DVec3::NEG_Z],
    [DVec3::NEG_Y, DVec3::X, DVec3::Z],
    [DVec3::Z, DVec3::X, DVec3::Y],
    [DVec3::NEG_Z, DVec3::NEG_X, DVec3::Y],
];

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Top,
        CubeFace::Bottom,
        CubeFace::Front,
        CubeFace::Back,
    ];

    /// Position in [`CubeFace::ALL`]; height fields store faces in this order.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `(normal, u, v)` with `u × v = normal`.
    #[must_use]
    pub fn frame(self) -> (DVec3, DVec3, DVec3) {
        let [normal, u, v] = FRAMES[self.index()];
        (normal, u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_right_handed() {
        for face in CubeFace::ALL {
            let (normal, u, v) = face.frame();
            assert!((u.cross(v) - normal).length() < 1e-12, "{face:?}");
            assert_eq!(u.dot(normal), 0.0);
            assert_eq!(v.dot(normal), 0.0);
        }
    }

    #[test]
    fn test_lit_faces_point_at_the_viewer() {
        // The viewer sits on the (1, 1, 1) diagonal.
        let view = DVec3::ONE.normalize();
        for face in [CubeFace::Right, CubeFace::Top, CubeFace::Front] {
            assert!(face.frame().0.dot(view) > 0.0, "{face:?}");
        }
        for face in [CubeFace::Left, CubeFace::Bottom, CubeFace::Back] {
            assert!(face.frame().0.dot(view) < 0.0, "{face:?}");
        }
    }
}
