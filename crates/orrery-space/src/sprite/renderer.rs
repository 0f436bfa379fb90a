//! GPU renderer for planet sprites using one instanced draw per frame.

use bytemuck::{Pod, Zeroable};
use orrery_planet::Atlas;
use orrery_render::{GpuTexture, ShaderError, ShaderLibrary, TextureError};
use wgpu::util::DeviceExt;

use super::{InstanceBatch, SpriteInstance, SpriteVertex};

/// Fragments with less coverage than this are discarded, giving hard
/// pixel-art edges without sorting.
pub const ALPHA_CUTOFF: f32 = 0.08;

/// Uniform block shared by both shader stages. 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    /// World → clip matrix as three padded columns.
    pub view: [[f32; 4]; 3],
    pub atlas_grid: u32,
    pub alpha_cutoff: f32,
    pub _padding: [f32; 2],
}

impl SpriteUniforms {
    pub fn new(view: [[f32; 4]; 3], atlas_grid: u32) -> Self {
        Self {
            view,
            atlas_grid: atlas_grid.max(1),
            alpha_cutoff: ALPHA_CUTOFF,
            _padding: [0.0; 2],
        }
    }
}

pub const SPRITE_SHADER_SOURCE: &str = r#"
struct SpriteUniforms {
    view: mat3x3<f32>,
    atlas_grid: u32,
    alpha_cutoff: f32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: SpriteUniforms;

@group(1) @binding(0)
var atlas_texture: texture_2d<f32>;
@group(1) @binding(1)
var atlas_sampler: sampler;

struct VertexInput {
    @location(0) corner: vec2<f32>,
    // Instance attributes
    @location(1) center: vec2<f32>,
    @location(2) size: f32,
    @location(3) rotation: f32,
    @location(4) atlas_index: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) @interpolate(flat) atlas_index: u32,
};

@vertex
fn vs_sprite(in: VertexInput) -> VertexOutput {
    let c = cos(in.rotation);
    let s = sin(in.rotation);
    let local = in.corner * in.size;
    let rotated = vec2<f32>(c * local.x - s * local.y, s * local.x + c * local.y);
    let projected = uniforms.view * vec3<f32>(in.center + rotated, 1.0);

    var out: VertexOutput;
    out.clip_position = vec4<f32>(projected.xy, 0.0, 1.0);
    // World Y points down, so the quad's top edge samples texture row 0.
    out.uv = in.corner + vec2<f32>(0.5, 0.5);
    out.atlas_index = in.atlas_index;
    return out;
}

@fragment
fn fs_sprite(in: VertexOutput) -> @location(0) vec4<f32> {
    let grid = max(uniforms.atlas_grid, 1u);
    let cell = vec2<f32>(f32(in.atlas_index % grid), f32(in.atlas_index / grid));
    let uv = (cell + in.uv) / f32(grid);
    let color = textureSample(atlas_texture, atlas_sampler, uv);
    if color.a < uniforms.alpha_cutoff {
        discard;
    }
    return color;
}
"#;

struct AtlasBinding {
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
    grid: u32,
}

/// Owns the sprite pipeline, its buffers, the bound atlas, and the frame's
/// [`InstanceBatch`].
pub struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    atlas_bgl: wgpu::BindGroupLayout,
    atlas: Option<AtlasBinding>,
    batch: InstanceBatch,
    uploaded_count: u32,
}

impl SpriteRenderer {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        surface_format: wgpu::TextureFormat,
        max_instances: usize,
    ) -> Result<Self, ShaderError> {
        let shader = shaders.load_from_source(device, "sprite", SPRITE_SHADER_SOURCE)?;
        let batch = InstanceBatch::new(max_instances);

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<SpriteUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let atlas_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite-atlas-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, &atlas_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sprite"),
                buffers: &[SpriteVertex::LAYOUT, SpriteInstance::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_sprite"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite-quad-verts"),
            contents: bytemuck::cast_slice(&SpriteVertex::QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite-quad-indices"),
            contents: bytemuck::cast_slice(&SpriteVertex::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite-instances"),
            size: (batch.max_instances() * std::mem::size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniforms = SpriteUniforms::new(glam::Mat3::IDENTITY.to_cols_array_2d().map(pad), 1);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite-uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite-uniform-bg"),
            layout: &uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "Sprite renderer initialized (max {} instances)",
            batch.max_instances()
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            uniform_buffer,
            uniform_bind_group,
            atlas_bgl,
            atlas: None,
            batch,
            uploaded_count: 0,
        })
    }

    /// Upload `atlas` as a nearest-sampled texture, replacing any previous one.
    pub fn set_atlas(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        atlas: &Atlas,
    ) -> Result<(), TextureError> {
        let (width, height) = atlas.image.dimensions();
        let texture = GpuTexture::from_rgba8(
            device,
            queue,
            "planet-atlas",
            width,
            height,
            atlas.image.as_raw(),
        )?;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite-atlas-bg"),
            layout: &self.atlas_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        if let Some(old) = self.atlas.replace(AtlasBinding {
            texture,
            bind_group,
            grid: atlas.grid,
        }) {
            old.texture.destroy();
        }
        log::info!(
            "Atlas bound: {} sprites in a {}x{} grid",
            atlas.count,
            atlas.grid,
            atlas.grid
        );
        Ok(())
    }

    pub fn has_atlas(&self) -> bool {
        self.atlas.is_some()
    }

    /// The batch to fill for the coming frame.
    pub fn batch_mut(&mut self) -> &mut InstanceBatch {
        &mut self.batch
    }

    pub fn batch(&self) -> &InstanceBatch {
        &self.batch
    }

    /// Write the camera and the batch's live instances to the GPU.
    pub fn upload(&mut self, queue: &wgpu::Queue, view: [[f32; 4]; 3]) {
        if !self.batch.mark_uploaded() {
            return;
        }
        let grid = self.atlas.as_ref().map_or(1, |a| a.grid);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&SpriteUniforms::new(view, grid)),
        );
        let instances = self.batch.instances();
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.uploaded_count = instances.len() as u32;
        if self.batch.dropped() > 0 {
            log::debug!("Sprite batch full, dropped {}", self.batch.dropped());
        }
    }

    /// Draw the uploaded batch. Does nothing until an atlas is bound and the
    /// batch has been uploaded this frame.
    pub fn draw(&mut self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(atlas) = &self.atlas else {
            return;
        };
        if !self.batch.mark_drawn() || self.uploaded_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &atlas.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..6, 0, 0..self.uploaded_count);
    }

    /// Free every buffer and the atlas texture.
    pub fn dispose(&mut self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.instance_buffer.destroy();
        self.uniform_buffer.destroy();
        if let Some(atlas) = self.atlas.take() {
            atlas.texture.destroy();
        }
        self.uploaded_count = 0;
    }
}

fn pad(c: [f32; 3]) -> [f32; 4] {
    [c[0], c[1], c[2], 0.0]
}
