use bytemuck::{Pod, Zeroable};

/// One vertex of a merged chunk mesh.
///
/// `color` carries `(world.x, world.y, world.z, grid.x)` of the owning item and
/// `anim` carries `(out_animation_end, in_animation_end)`; the fading shader
/// drives item transitions from these alone.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub anim: [f32; 2],
}

/// CPU-side buffers of a merged mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Faces emitted after culling.
    pub face_count: usize,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index the next face's triangles will be offset by.
    pub fn base_index(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Vertex buffer bytes ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer bytes ready for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
