//! The galaxy scene: CPU state driven by input and time, plus the GPU
//! resources that draw it.

use std::sync::Arc;

use glam::Vec2;
use orrery_planet::{Atlas, AtlasOptions, PlanetError, SharedAtlasCache};
use orrery_render::{Camera2D, ShaderError, ShaderLibrary, TextureError};

use crate::atlas_job::AtlasJob;
use crate::placement::{SceneObject, scatter_objects};
use crate::sprite::{InstanceBatch, SpriteRenderer};
use crate::starfield::{StarfieldBackground, StarfieldUniforms};

/// Longest step `update` will integrate, in seconds.
pub const MAX_FRAME_DT: f32 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("atlas build failed: {0}")]
    Atlas(#[from] PlanetError),

    #[error("failed to start atlas builder: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Window-system-independent input, in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneInput {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Negative `delta` zooms in, positive zooms out, around `(x, y)`.
    Wheel { x: f32, y: f32, delta: f32 },
    Resize { width: f32, height: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GalaxySettings {
    pub object_count: usize,
    pub world_radius: f32,
    pub layout_seed: u64,
    pub max_instances: usize,
    pub atlas: AtlasOptions,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom multiplier per wheel notch.
    pub zoom_step: f32,
}

impl Default for GalaxySettings {
    fn default() -> Self {
        Self {
            object_count: 10_000,
            world_radius: 12_000.0,
            layout_seed: 1337,
            max_instances: 10_000,
            atlas: AtlasOptions {
                count: 16,
                cell_size: 64,
                base_seed: 7000,
                palette: None,
            },
            min_zoom: orrery_render::DEFAULT_MIN_ZOOM,
            max_zoom: orrery_render::DEFAULT_MAX_ZOOM,
            zoom_step: 1.1,
        }
    }
}

/// Everything about the galaxy that lives on the CPU.
#[derive(Clone, Debug)]
pub struct GalaxyState {
    pub camera: Camera2D,
    objects: Vec<SceneObject>,
    elapsed: f32,
    drag: Option<Vec2>,
    viewport: Vec2,
    zoom_step: f32,
}

impl GalaxyState {
    pub fn new(settings: &GalaxySettings, width: f32, height: f32) -> Self {
        let atlas_count = settings.atlas.normalized().count;
        let zoom_step = if settings.zoom_step.is_finite() && settings.zoom_step > 1.0 {
            settings.zoom_step
        } else {
            1.1
        };
        Self {
            camera: Camera2D::new().with_zoom_limits(settings.min_zoom, settings.max_zoom),
            objects: scatter_objects(
                settings.object_count,
                settings.world_radius,
                settings.layout_seed,
                atlas_count,
            ),
            elapsed: 0.0,
            drag: None,
            viewport: Vec2::new(width.max(1.0), height.max(1.0)),
            zoom_step,
        }
    }

    /// Advance time by `dt` seconds, clamped to `[0, MAX_FRAME_DT]`.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.elapsed += dt;
        for object in &mut self.objects {
            object.spin(dt);
        }
    }

    pub fn handle_input(&mut self, input: SceneInput) {
        match input {
            SceneInput::PointerDown { x, y } => self.drag = Some(Vec2::new(x, y)),
            SceneInput::PointerMove { x, y } => {
                if let Some(last) = self.drag {
                    let zoom = self.camera.zoom();
                    self.camera.pan(-(x - last.x) / zoom, -(y - last.y) / zoom);
                    self.drag = Some(Vec2::new(x, y));
                }
            }
            SceneInput::PointerUp => self.drag = None,
            SceneInput::Wheel { x, y, delta } => {
                if delta == 0.0 || !delta.is_finite() {
                    return;
                }
                let factor = if delta < 0.0 {
                    self.zoom_step
                } else {
                    1.0 / self.zoom_step
                };
                self.camera
                    .zoom_at(x, y, factor, self.viewport.x, self.viewport.y);
            }
            SceneInput::Resize { width, height } => {
                self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
            }
        }
    }

    /// Start a new batch and push every object overlapping the viewport.
    /// Returns how many were accepted.
    pub fn collect_visible(&self, batch: &mut InstanceBatch) -> usize {
        batch.begin();
        let (w, h) = (self.viewport.x, self.viewport.y);
        self.objects
            .iter()
            .filter(|o| self.camera.is_in_view(o.x, o.y, o.size, w, h))
            .filter(|o| batch.push(o.x, o.y, o.size, o.rotation, o.atlas_index))
            .count()
    }

    pub fn starfield_uniforms(&self) -> StarfieldUniforms {
        StarfieldUniforms::new(&self.camera, self.elapsed, self.viewport.x, self.viewport.y)
    }

    pub fn camera_columns(&self) -> [[f32; 4]; 3] {
        self.camera.uniform_columns(self.viewport.x, self.viewport.y)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}

/// The galaxy view with its GPU resources.
///
/// Created by [`init`](Self::init), which also starts building the atlas in
/// the background. Sprites appear once [`poll_atlas`](Self::poll_atlas) picks
/// the atlas up; until then only the starfield draws.
pub struct GalaxyScene {
    state: GalaxyState,
    shaders: ShaderLibrary,
    sprites: SpriteRenderer,
    starfield: StarfieldBackground,
    atlas_job: Option<AtlasJob>,
    atlas: Option<Arc<Atlas>>,
    disposed: bool,
}

impl GalaxyScene {
    pub fn init(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        settings: &GalaxySettings,
        cache: SharedAtlasCache,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        let state = GalaxyState::new(settings, width as f32, height as f32);
        let mut shaders = ShaderLibrary::new();
        let starfield = StarfieldBackground::new(device, &mut shaders, surface_format)?;
        let sprites =
            SpriteRenderer::new(device, &mut shaders, surface_format, settings.max_instances)?;
        let atlas_job = AtlasJob::spawn(cache, settings.atlas)?;

        log::info!(
            "Galaxy scene initialized: {} objects, atlas of {} building",
            state.objects().len(),
            settings.atlas.normalized().count
        );

        Ok(Self {
            state,
            shaders,
            sprites,
            starfield,
            atlas_job: Some(atlas_job),
            atlas: None,
            disposed: false,
        })
    }

    pub fn state(&self) -> &GalaxyState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GalaxyState {
        &mut self.state
    }

    pub fn update(&mut self, dt: f32) {
        self.state.update(dt);
    }

    pub fn handle_input(&mut self, input: SceneInput) {
        self.state.handle_input(input);
    }

    /// Bind the atlas if the background build has finished. Returns `true`
    /// on the frame the atlas becomes available.
    pub fn poll_atlas(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<bool, SceneError> {
        if self.disposed {
            return Ok(false);
        }
        let Some(job) = self.atlas_job.as_mut() else {
            return Ok(false);
        };
        let Some(result) = job.poll() else {
            if job.is_finished() {
                log::warn!("Atlas builder exited without a result");
                self.atlas_job = None;
            }
            return Ok(false);
        };
        self.atlas_job = None;
        let atlas = result?;
        self.sprites.set_atlas(device, queue, &atlas)?;
        self.atlas = Some(atlas);
        Ok(true)
    }

    /// Block until the atlas is built and bind it.
    pub fn wait_for_atlas(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<bool, SceneError> {
        if self.disposed {
            return Ok(false);
        }
        let Some(job) = self.atlas_job.take() else {
            return Ok(self.atlas.is_some());
        };
        let Some(result) = job.wait() else {
            return Ok(false);
        };
        let atlas = result?;
        self.sprites.set_atlas(device, queue, &atlas)?;
        self.atlas = Some(atlas);
        Ok(true)
    }

    pub fn atlas(&self) -> Option<&Arc<Atlas>> {
        self.atlas.as_ref()
    }

    /// Cull, batch, and upload this frame's sprites and background uniforms.
    pub fn prepare(&mut self, queue: &wgpu::Queue) {
        if self.disposed {
            return;
        }
        self.state.collect_visible(self.sprites.batch_mut());
        self.sprites.upload(queue, self.state.camera_columns());
        self.starfield.update(queue, &self.state.starfield_uniforms());
    }

    /// Record the starfield then the sprites into `pass`.
    pub fn draw(&mut self, pass: &mut wgpu::RenderPass<'_>) {
        if self.disposed {
            return;
        }
        self.starfield.draw(pass);
        self.sprites.draw(pass);
    }

    /// Sprites in the last prepared batch.
    pub fn visible_count(&self) -> usize {
        self.sprites.batch().len()
    }

    /// Cancel the atlas build and free every GPU resource. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(job) = self.atlas_job.take() {
            job.cancel();
        }
        self.sprites.dispose();
        self.starfield.dispose();
        self.shaders.clear();
        self.atlas = None;
        self.disposed = true;
        log::info!("Galaxy scene disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for GalaxyScene {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::BatchState;

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn small_settings() -> GalaxySettings {
        GalaxySettings {
            object_count: 400,
            world_radius: 2_000.0,
            max_instances: 64,
            atlas: AtlasOptions {
                count: 4,
                cell_size: 16,
                base_seed: 7000,
                palette: None,
            },
            ..GalaxySettings::default()
        }
    }

    #[test]
    fn test_default_settings_describe_the_galaxy() {
        let s = GalaxySettings::default();
        assert_eq!(s.object_count, 10_000);
        assert_eq!(s.layout_seed, 1337);
        assert_eq!(s.world_radius, 12_000.0);
        assert_eq!(s.atlas.count, 16);
        assert_eq!(s.atlas.base_seed, 7000);
    }

    #[test]
    fn test_update_clamps_dt() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        let before = state.objects()[0];
        state.update(10.0);
        assert!((state.elapsed() - MAX_FRAME_DT).abs() < 1e-6);
        let after = state.objects()[0];
        let expected = (before.rotation + before.rotation_speed * MAX_FRAME_DT)
            .rem_euclid(std::f32::consts::TAU);
        assert!((after.rotation - expected).abs() < 1e-5);

        state.update(-1.0);
        state.update(f32::NAN);
        assert!((state.elapsed() - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_drag_pans_opposite_to_pointer() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        state.camera.set_zoom(2.0);
        state.handle_input(SceneInput::PointerMove { x: 50.0, y: 50.0 });
        assert_eq!(state.camera.position(), Vec2::ZERO);

        state.handle_input(SceneInput::PointerDown { x: 100.0, y: 100.0 });
        state.handle_input(SceneInput::PointerMove { x: 140.0, y: 80.0 });
        assert_eq!(state.camera.position(), Vec2::new(-20.0, 10.0));
        state.handle_input(SceneInput::PointerUp);
        assert!(!state.is_dragging());
        state.handle_input(SceneInput::PointerMove { x: 0.0, y: 0.0 });
        assert_eq!(state.camera.position(), Vec2::new(-20.0, 10.0));
    }

    #[test]
    fn test_drag_keeps_grabbed_point_under_pointer() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        state.camera.set_zoom(3.0);
        let grabbed = state.camera.screen_to_world(300.0, 200.0, W, H);
        state.handle_input(SceneInput::PointerDown { x: 300.0, y: 200.0 });
        state.handle_input(SceneInput::PointerMove { x: 420.0, y: 260.0 });
        let under = state.camera.screen_to_world(420.0, 260.0, W, H);
        assert!((grabbed - under).length() < 1e-3);
    }

    #[test]
    fn test_wheel_zooms_toward_cursor() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        let anchor = state.camera.screen_to_world(200.0, 600.0, W, H);
        state.handle_input(SceneInput::Wheel { x: 200.0, y: 600.0, delta: -1.0 });
        assert!((state.camera.zoom() - 1.1).abs() < 1e-6);
        let after = state.camera.screen_to_world(200.0, 600.0, W, H);
        assert!((anchor - after).length() < 1e-3);

        state.handle_input(SceneInput::Wheel { x: 200.0, y: 600.0, delta: 3.0 });
        assert!((state.camera.zoom() - 1.0).abs() < 1e-5);
        state.handle_input(SceneInput::Wheel { x: 0.0, y: 0.0, delta: 0.0 });
        assert!((state.camera.zoom() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_changes_culling_extent() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        let mut batch = InstanceBatch::new(10_000);
        let wide = state.collect_visible(&mut batch);
        state.handle_input(SceneInput::Resize { width: 100.0, height: 100.0 });
        let narrow = state.collect_visible(&mut batch);
        assert!(narrow < wide);
        state.handle_input(SceneInput::Resize { width: 0.0, height: -5.0 });
        assert_eq!(state.viewport(), Vec2::ONE);
    }

    #[test]
    fn test_collect_visible_culls_and_caps() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        let mut batch = InstanceBatch::new(64);
        let pushed = state.collect_visible(&mut batch);
        assert_eq!(batch.state(), BatchState::Accumulating);
        assert_eq!(pushed, batch.len());
        assert!(pushed <= 64);

        state.camera.x = 1.0e6;
        assert_eq!(state.collect_visible(&mut batch), 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_all_objects_visible_when_zoomed_out_over_small_disc() {
        let settings = GalaxySettings {
            world_radius: 100.0,
            max_instances: 1_000,
            ..small_settings()
        };
        let state = GalaxyState::new(&settings, W, H);
        let mut batch = InstanceBatch::new(settings.max_instances);
        assert_eq!(state.collect_visible(&mut batch), settings.object_count);
        assert!(batch.instances().iter().all(|i| i.atlas_index < 4));
    }

    #[test]
    fn test_overflowing_batch_counts_drops() {
        let settings = GalaxySettings {
            world_radius: 100.0,
            ..small_settings()
        };
        let state = GalaxyState::new(&settings, W, H);
        let mut batch = InstanceBatch::new(settings.max_instances);
        assert_eq!(state.collect_visible(&mut batch), 64);
        assert_eq!(batch.dropped(), settings.object_count - 64);
    }

    #[test]
    fn test_starfield_uniforms_track_state() {
        let mut state = GalaxyState::new(&small_settings(), W, H);
        state.camera.pan(5.0, 6.0);
        state.update(0.02);
        let u = state.starfield_uniforms();
        assert_eq!(u.camera, [5.0, 6.0]);
        assert_eq!(u.resolution, [W, H]);
        assert!((u.time - 0.02).abs() < 1e-6);
    }

    fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_scene_lifecycle_renders_and_disposes_twice() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let cache = orrery_planet::AtlasCache::shared();
        let settings = GalaxySettings {
            world_radius: 150.0,
            ..small_settings()
        };
        let mut scene = GalaxyScene::init(&device, format, &settings, cache, 320, 240).unwrap();
        assert!(scene.wait_for_atlas(&device, &queue).unwrap());
        assert_eq!(scene.atlas().map(|a| a.count), Some(4));

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scene-test-target"),
            size: wgpu::Extent3d {
                width: 320,
                height: 240,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        scene.update(0.016);
        scene.prepare(&queue);
        assert!(scene.visible_count() > 0);
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = orrery_render::RenderPassBuilder::new().begin(&mut encoder, &view);
            scene.draw(&mut pass);
        }
        queue.submit([encoder.finish()]);

        scene.dispose();
        assert!(scene.is_disposed());
        scene.dispose();
        assert!(!scene.poll_atlas(&device, &queue).unwrap());
        target.destroy();
    }
}
