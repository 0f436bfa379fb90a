//! 2D pan/zoom camera.
//!
//! World space shares the screen's orientation: +x right, +y down. The camera
//! position is the world point shown at the centre of the viewport, and
//! `zoom` is screen pixels per world unit.

use glam::{Mat3, Vec2, Vec3};

pub const DEFAULT_MIN_ZOOM: f32 = 0.2;
pub const DEFAULT_MAX_ZOOM: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub x: f32,
    pub y: f32,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera2D {
    /// Camera at the origin with zoom 1.
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Replace the zoom limits and re-clamp the current zoom.
    ///
    /// Limits are reordered if given backwards; non-finite or non-positive
    /// limits keep the defaults.
    pub fn with_zoom_limits(mut self, min_zoom: f32, max_zoom: f32) -> Self {
        let valid = |z: f32| z.is_finite() && z > 0.0;
        let (lo, hi) = if valid(min_zoom) && valid(max_zoom) {
            (min_zoom.min(max_zoom), min_zoom.max(max_zoom))
        } else {
            (DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
        };
        self.min_zoom = lo;
        self.max_zoom = hi;
        self.zoom = self.zoom.clamp(lo, hi);
        self
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Translate by a world-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.x += dx;
            self.y += dy;
        }
    }

    /// Set the zoom, clamped to the limits. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32, width: f32, height: f32) -> Vec2 {
        Vec2::new(
            self.x + (sx - width * 0.5) / self.zoom,
            self.y + (sy - height * 0.5) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, wx: f32, wy: f32, width: f32, height: f32) -> Vec2 {
        Vec2::new(
            (wx - self.x) * self.zoom + width * 0.5,
            (wy - self.y) * self.zoom + height * 0.5,
        )
    }

    /// Multiply the zoom by `factor` while keeping the world point under
    /// `(sx, sy)` fixed on screen.
    pub fn zoom_at(&mut self, sx: f32, sy: f32, factor: f32, width: f32, height: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let anchor = self.screen_to_world(sx, sy, width, height);
        self.set_zoom(self.zoom * factor);
        let after = self.screen_to_world(sx, sy, width, height);
        self.x += anchor.x - after.x;
        self.y += anchor.y - after.y;
    }

    /// World to clip-space transform. Clip Y points up, so the Y scale is
    /// negated.
    pub fn matrix(&self, width: f32, height: f32) -> Mat3 {
        let sx = 2.0 * self.zoom / width.max(1.0);
        let sy = 2.0 * self.zoom / height.max(1.0);
        Mat3::from_cols(
            Vec3::new(sx, 0.0, 0.0),
            Vec3::new(0.0, -sy, 0.0),
            Vec3::new(-self.x * sx, self.y * sy, 1.0),
        )
    }

    /// [`Self::matrix`] as three `vec4` columns, the layout WGSL expects for
    /// a `mat3x3<f32>` in a uniform buffer.
    pub fn uniform_columns(&self, width: f32, height: f32) -> [[f32; 4]; 3] {
        let m = self.matrix(width, height);
        [m.x_axis, m.y_axis, m.z_axis].map(|c| [c.x, c.y, c.z, 0.0])
    }

    /// Whether a circle of `radius` at `(x, y)` overlaps the viewport,
    /// using an axis-aligned box test.
    pub fn is_in_view(&self, x: f32, y: f32, radius: f32, width: f32, height: f32) -> bool {
        let half_w = width * 0.5 / self.zoom + radius;
        let half_h = height * 0.5 / self.zoom + radius;
        (x - self.x).abs() <= half_w && (y - self.y).abs() <= half_h
    }
}
