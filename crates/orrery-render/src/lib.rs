//! wgpu plumbing for the orrery: device and surface setup, shader loading,
//! frame encoding, sampled textures, and the 2D camera.

pub mod camera;
pub mod gpu;
pub mod pass;
pub mod shader;
pub mod texture;

pub use camera::{Camera2D, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{DEEP_SPACE, FrameEncoder, RenderPassBuilder};
pub use shader::{ShaderError, ShaderLibrary, validate_wgsl};
pub use texture::{GpuTexture, TextureError};

#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                ..Default::default()
            })
            .await
            .ok()
    })
}
