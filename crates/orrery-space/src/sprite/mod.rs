//! Instanced planet sprites: per-frame instance batching and the GPU
//! renderer that draws the batch from the planet atlas.
//!
//! Every sprite is the same unit quad; per-instance data places, scales,
//! rotates, and picks the atlas cell for each copy.

use bytemuck::{Pod, Zeroable};

mod renderer;

pub use renderer::{SPRITE_SHADER_SOURCE, SpriteRenderer, SpriteUniforms};

/// GPU instance data for one sprite. 20 bytes, tightly packed.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Centre in world units.
    pub position: [f32; 2],
    /// Edge length in world units.
    pub size: f32,
    /// Radians.
    pub rotation: f32,
    pub atlas_index: u32,
}

impl SpriteInstance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 8,
                shader_location: 2,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 12,
                shader_location: 3,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Uint32,
                offset: 16,
                shader_location: 4,
            },
        ],
    };
}

/// Corner of the unit sprite quad, in `[-0.5, 0.5]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct SpriteVertex {
    pub position: [f32; 2],
}

impl SpriteVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        }],
    };

    pub const QUAD: [SpriteVertex; 4] = [
        SpriteVertex {
            position: [-0.5, -0.5],
        },
        SpriteVertex {
            position: [0.5, -0.5],
        },
        SpriteVertex {
            position: [0.5, 0.5],
        },
        SpriteVertex {
            position: [-0.5, 0.5],
        },
    ];

    pub const INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];
}

/// Where a batch is in its per-frame cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    /// Never begun.
    Empty,
    Accumulating,
    Uploaded,
    Drawn,
}

/// CPU-side instance list for one frame, capped at `max_instances`.
#[derive(Debug)]
pub struct InstanceBatch {
    instances: Vec<SpriteInstance>,
    max_instances: usize,
    dropped: usize,
    state: BatchState,
}

impl InstanceBatch {
    /// A batch holding at most `max_instances` sprites (at least one).
    pub fn new(max_instances: usize) -> Self {
        let max_instances = max_instances.max(1);
        Self {
            instances: Vec::with_capacity(max_instances),
            max_instances,
            dropped: 0,
            state: BatchState::Empty,
        }
    }

    /// Start a new frame: forget last frame's instances.
    pub fn begin(&mut self) {
        self.instances.clear();
        self.dropped = 0;
        self.state = BatchState::Accumulating;
    }

    /// Append one sprite. Returns `false` when the sprite was not added,
    /// either because the batch is not accumulating or because it is full.
    /// Overflow is counted in [`dropped`](Self::dropped).
    pub fn push(&mut self, x: f32, y: f32, size: f32, rotation: f32, atlas_index: u32) -> bool {
        if self.state != BatchState::Accumulating {
            return false;
        }
        if self.instances.len() >= self.max_instances {
            self.dropped += 1;
            return false;
        }
        self.instances.push(SpriteInstance {
            position: [x, y],
            size,
            rotation,
            atlas_index,
        });
        true
    }

    /// Accumulating → Uploaded. Returns whether the transition happened.
    pub fn mark_uploaded(&mut self) -> bool {
        self.advance(BatchState::Accumulating, BatchState::Uploaded)
    }

    /// Uploaded → Drawn. Returns whether the transition happened.
    pub fn mark_drawn(&mut self) -> bool {
        self.advance(BatchState::Uploaded, BatchState::Drawn)
    }

    fn advance(&mut self, from: BatchState, to: BatchState) -> bool {
        if self.state == from {
            self.state = to;
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    /// Sprites rejected this frame because the batch was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_is_twenty_bytes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 20);
        assert_eq!(SpriteInstance::LAYOUT.array_stride, 20);
        assert_eq!(SpriteInstance::LAYOUT.step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn test_instance_bytes_are_packed_in_field_order() {
        let inst = SpriteInstance {
            position: [1.0, 2.0],
            size: 3.0,
            rotation: 4.0,
            atlas_index: 5,
        };
        let bytes: &[u8] = bytemuck::bytes_of(&inst);
        assert_eq!(&bytes[8..12], &3.0f32.to_ne_bytes());
        assert_eq!(&bytes[16..20], &5u32.to_ne_bytes());
    }

    #[test]
    fn test_push_before_begin_is_ignored() {
        let mut batch = InstanceBatch::new(4);
        assert_eq!(batch.state(), BatchState::Empty);
        assert!(!batch.push(0.0, 0.0, 1.0, 0.0, 0));
        assert!(batch.is_empty());
        assert_eq!(batch.dropped(), 0);
    }

    #[test]
    fn test_overflow_is_dropped_silently() {
        let mut batch = InstanceBatch::new(8);
        batch.begin();
        let accepted = (0..8 + 5)
            .filter(|i| batch.push(*i as f32, 0.0, 10.0, 0.0, 0))
            .count();
        assert_eq!(accepted, 8);
        assert_eq!(batch.len(), batch.max_instances());
        assert_eq!(batch.dropped(), 5);
        assert_eq!(batch.instances()[7].position, [7.0, 0.0]);
    }

    #[test]
    fn test_state_machine_follows_frame_order() {
        let mut batch = InstanceBatch::new(2);
        assert!(!batch.mark_uploaded());
        batch.begin();
        assert!(!batch.mark_drawn());
        assert!(batch.push(0.0, 0.0, 1.0, 0.0, 1));
        assert!(batch.mark_uploaded());
        assert!(!batch.push(1.0, 1.0, 1.0, 0.0, 1));
        assert!(batch.mark_drawn());
        assert_eq!(batch.state(), BatchState::Drawn);
        assert!(!batch.mark_drawn());
    }

    #[test]
    fn test_begin_resets_count_and_drops() {
        let mut batch = InstanceBatch::new(1);
        batch.begin();
        batch.push(0.0, 0.0, 1.0, 0.0, 0);
        batch.push(0.0, 0.0, 1.0, 0.0, 0);
        assert_eq!(batch.dropped(), 1);
        batch.begin();
        assert!(batch.is_empty());
        assert_eq!(batch.dropped(), 0);
        assert_eq!(batch.state(), BatchState::Accumulating);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        assert_eq!(InstanceBatch::new(0).max_instances(), 1);
    }

    #[test]
    fn test_quad_spans_unit_square() {
        let xs: Vec<f32> = SpriteVertex::QUAD.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![-0.5, 0.5, 0.5, -0.5]);
        assert!(SpriteVertex::INDICES.iter().all(|i| (*i as usize) < SpriteVertex::QUAD.len()));
    }
}
