//! Render pass abstraction for reducing wgpu boilerplate.
//!
//! Provides [`RenderPassBuilder`] for declarative render pass configuration
//! and [`FrameEncoder`] for managing per-frame command encoding lifecycle.

use std::sync::Arc;

/// Deep-space clear colour, matching the starfield base tone.
pub const DEEP_SPACE: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.08,
    a: 1.0,
};

/// Builder for a single-colour-attachment render pass.
#[derive(Debug)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// Create a new render pass builder clearing to [`DEEP_SPACE`].
    pub fn new() -> Self {
        Self {
            clear_color: DEEP_SPACE,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Set debug label for the render pass.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Begin a pass on `encoder` that clears and stores `color_view`.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &'encoder wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Manages per-frame command encoding lifecycle with automatic submission.
pub struct FrameEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    queue: Arc<wgpu::Queue>,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: Some(surface_texture),
            surface_view,
        }
    }

    /// Begin a render pass on the surface view. `None` only after the frame
    /// has been finished.
    pub fn begin_render_pass<'a>(
        &'a mut self,
        builder: &'a RenderPassBuilder,
    ) -> Option<wgpu::RenderPass<'a>> {
        let encoder = self.encoder.as_mut()?;
        Some(builder.begin(encoder, &self.surface_view))
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Submit the command buffer and present. Consumes self to prevent
    /// double submission.
    pub fn submit(mut self) {
        self.finish();
    }

    fn finish(&mut self) -> bool {
        let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        else {
            return false;
        };
        self.queue.submit([encoder.finish()]);
        surface_texture.present();
        true
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!("FrameEncoder dropped without explicit submit() - auto-submitting");
            self.finish();
        }
    }
}
