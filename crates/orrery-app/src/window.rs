//! The galaxy window via winit.
//!
//! [`GalaxyApp`] implements winit's [`ApplicationHandler`]: it creates the
//! window and GPU context on resume, forwards input to the scene, and draws
//! one frame per redraw.

use std::sync::Arc;

use orrery_config::Config;
use orrery_planet::{AtlasCache, AtlasOptions, PalettePreset, SharedAtlasCache};
use orrery_render::{
    DEEP_SPACE, FrameEncoder, RenderContext, RenderPassBuilder, SurfaceError,
    init_render_context_blocking,
};
use orrery_space::{GalaxyScene, GalaxySettings};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::AppError;
use crate::frame_clock::FrameClock;
use crate::input::InputAdapter;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Scene settings from the loaded config.
pub fn galaxy_settings_from_config(config: &Config) -> GalaxySettings {
    GalaxySettings {
        object_count: config.galaxy.object_count,
        world_radius: config.galaxy.world_radius,
        layout_seed: config.galaxy.layout_seed,
        max_instances: config.galaxy.max_instances,
        atlas: AtlasOptions {
            count: config.atlas.count,
            cell_size: config.atlas.cell_size,
            base_seed: config.atlas.base_seed,
            palette: config
                .atlas
                .palette
                .as_deref()
                .map(PalettePreset::from_name_or_default),
        },
        min_zoom: config.camera.min_zoom,
        max_zoom: config.camera.max_zoom,
        zoom_step: config.camera.zoom_step,
    }
}

pub struct GalaxyApp {
    config: Config,
    settings: GalaxySettings,
    cache: SharedAtlasCache,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    scene: Option<GalaxyScene>,
    clock: FrameClock,
    input: InputAdapter,
    fatal: Option<AppError>,
}

impl GalaxyApp {
    pub fn new(config: Config) -> Self {
        let settings = galaxy_settings_from_config(&config);
        Self {
            config,
            settings,
            cache: AtlasCache::shared(),
            window: None,
            gpu: None,
            scene: None,
            clock: FrameClock::new(),
            input: InputAdapter::new(),
            fatal: None,
        }
    }

    pub fn settings(&self) -> &GalaxySettings {
        &self.settings
    }

    /// Record a fatal error and stop the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.fatal = Some(err);
        self.shutdown();
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let (width, height) = gpu.size();
        info!(
            "GPU ready: {} ({:?}), surface {}x{} {:?}",
            gpu.adapter.get_info().name,
            gpu.adapter.get_info().backend,
            width,
            height,
            gpu.surface_format
        );

        let scene = GalaxyScene::init(
            &gpu.device,
            gpu.surface_format,
            &self.settings,
            Arc::clone(&self.cache),
            width,
            height,
        )?;

        self.scene = Some(scene);
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(scene)) = (&mut self.gpu, &mut self.scene) else {
            return;
        };

        let dt = self.clock.tick();
        scene.update(dt);

        match scene.poll_atlas(&gpu.device, &gpu.queue) {
            Ok(true) => info!("Planet atlas bound, drawing sprites"),
            Ok(false) => {}
            // The starfield keeps drawing without sprites.
            Err(e) => error!("Atlas unavailable: {e}"),
        }
        scene.prepare(&gpu.queue);

        match gpu.get_current_texture() {
            Ok(surface_texture) => {
                let mut frame = FrameEncoder::new(&gpu.device, gpu.queue.clone(), surface_texture);
                let builder = RenderPassBuilder::new()
                    .clear_color(DEEP_SPACE)
                    .label("galaxy-pass");
                if let Some(mut pass) = frame.begin_render_pass(&builder) {
                    scene.draw(&mut pass);
                }
                frame.submit();
            }
            Err(SurfaceError::Lost) => {
                let (w, h) = gpu.size();
                gpu.resize(w, h);
            }
            Err(SurfaceError::Timeout) => warn!("Surface timeout, skipping frame"),
            Err(e @ SurfaceError::OutOfMemory) => {
                self.fail(event_loop, e.into());
                return;
            }
        }

        if self.clock.frame_count() % 600 == 0 {
            tracing::debug!(
                frames = self.clock.frame_count(),
                clamped = self.clock.clamped_count(),
                visible = scene.visible_count(),
                "Frame stats"
            );
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Dispose the scene before the device goes away.
    fn shutdown(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.dispose();
        }
        self.gpu = None;
    }
}

impl ApplicationHandler for GalaxyApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
                if let Some(scene) = &mut self.scene {
                    scene.handle_input(InputAdapter::resized(size));
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            other => {
                if let (Some(input), Some(scene)) = (self.input.translate(&other), &mut self.scene) {
                    scene.handle_input(input);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Open the galaxy window and block until it closes.
#[instrument(skip_all)]
pub fn run_galaxy(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = GalaxyApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.galaxy.object_count = 42;
        config.galaxy.layout_seed = 7;
        config.atlas.palette = Some("ice".to_string());
        config.camera.max_zoom = 4.0;

        let settings = galaxy_settings_from_config(&config);
        assert_eq!(settings.object_count, 42);
        assert_eq!(settings.layout_seed, 7);
        assert_eq!(settings.atlas.palette, Some(PalettePreset::Ice));
        assert_eq!(settings.max_zoom, 4.0);
    }

    #[test]
    fn test_default_config_matches_default_settings() {
        assert_eq!(
            galaxy_settings_from_config(&Config::default()),
            GalaxySettings::default()
        );
    }

    #[test]
    fn test_unknown_atlas_palette_falls_back() {
        let mut config = Config::default();
        config.atlas.palette = Some("neon".to_string());
        let settings = galaxy_settings_from_config(&config);
        assert_eq!(settings.atlas.palette, Some(PalettePreset::Earth));
    }

    #[test]
    fn test_new_app_has_no_window() {
        let app = GalaxyApp::new(Config::default());
        assert!(app.window.is_none());
        assert!(app.scene.is_none());
        assert!(app.fatal.is_none());
        assert_eq!(app.settings().object_count, 10_000);
    }
}
