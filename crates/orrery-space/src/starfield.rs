//! Procedural starfield background.
//!
//! A fullscreen triangle whose fragment shader hashes a world-space grid into
//! sparse twinkling stars across three parallax layers. Nothing is stored per
//! star; the camera, zoom, time, and resolution uniforms fully determine the
//! image.

use bytemuck::{Pod, Zeroable};
use orrery_render::{Camera2D, ShaderError, ShaderLibrary};
use wgpu::util::DeviceExt;

/// Uniform block for the starfield pass. 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StarfieldUniforms {
    pub camera: [f32; 2],
    pub zoom: f32,
    /// Seconds since the scene started.
    pub time: f32,
    pub resolution: [f32; 2],
    pub _padding: [f32; 2],
}

impl StarfieldUniforms {
    pub fn new(camera: &Camera2D, time: f32, width: f32, height: f32) -> Self {
        Self {
            camera: [camera.x, camera.y],
            zoom: camera.zoom(),
            time,
            resolution: [width, height],
            _padding: [0.0; 2],
        }
    }
}

pub const STARFIELD_SHADER_SOURCE: &str = r#"
struct StarfieldUniforms {
    camera: vec2<f32>,
    zoom: f32,
    time: f32,
    resolution: vec2<f32>,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> sky: StarfieldUniforms;

const CELL_SIZE: f32 = 140.0;
const STAR_THRESHOLD: f32 = 0.94;
const BASE_COLOR: vec3<f32> = vec3<f32>(0.02, 0.02, 0.08);
const STAR_COLOR: vec3<f32> = vec3<f32>(0.62, 0.78, 1.0);

fn hash(cell: vec2<f32>) -> f32 {
    var p = fract(cell * vec2<f32>(123.34, 456.21));
    p = p + vec2<f32>(dot(p, p + vec2<f32>(78.233, 78.233)));
    return fract(p.x * p.y);
}

// Star intensity for one layer. Layers with smaller parallax drift less as
// the camera pans, reading as further away.
fn star_layer(frag: vec2<f32>, parallax: f32, offset: vec2<f32>) -> f32 {
    let zoom = max(sky.zoom, 0.0001);
    let world = (frag - sky.resolution * 0.5) / zoom + sky.camera * parallax + offset;
    let n = hash(floor(world / CELL_SIZE));
    let local = fract(world / CELL_SIZE) - vec2<f32>(0.5, 0.5);
    let core = 1.0 - smoothstep(0.0, 0.06, length(local));
    let twinkle = 0.65 + 0.35 * sin(sky.time * 1.3 + n * 12.0);
    return step(STAR_THRESHOLD, n) * core * twinkle;
}

@vertex
fn vs_starfield(@builtin(vertex_index) idx: u32) -> @builtin(position) vec4<f32> {
    // Fullscreen triangle
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
}

@fragment
fn fs_starfield(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    var light = star_layer(frag.xy, 1.0, vec2<f32>(0.0, 0.0));
    light = light + star_layer(frag.xy, 0.55, vec2<f32>(53.7, 91.3)) * 0.7;
    light = light + star_layer(frag.xy, 0.25, vec2<f32>(17.1, 33.9)) * 0.45;
    return vec4<f32>(BASE_COLOR + STAR_COLOR * light, 1.0);
}
"#;

/// GPU pass drawing the starfield behind the sprites.
pub struct StarfieldBackground {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl StarfieldBackground {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let shader = shaders.load_from_source(device, "starfield", STARFIELD_SHADER_SOURCE)?;

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("starfield-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<StarfieldUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_starfield"),
                buffers: &[],
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
                entry_point: Some("fs_starfield"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let uniforms = StarfieldUniforms::new(&Camera2D::new(), 0.0, 1.0, 1.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("starfield-uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starfield-uniform-bg"),
            layout: &uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!("Starfield background initialized");

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    pub fn update(&self, queue: &wgpu::Queue, uniforms: &StarfieldUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Draw the background. Call first in the pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    pub fn dispose(&self) {
        self.uniform_buffer.destroy();
    }
}
