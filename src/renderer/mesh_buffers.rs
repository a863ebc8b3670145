//! Chunk Mesh Buffers: uploads a [`ChunkMesh`]'s CPU-side streams to one
//! GPU vertex/index buffer pair per non-empty stream. Main-thread only.

use wgpu::util::DeviceExt;

use crate::world::mesh::chunk_mesh::{ChunkMesh, VertexStream};

/// One stream's GPU-side buffers, present only once `compile_to_gpu` has
/// run on a non-empty stream.
#[derive(Default)]
pub struct StreamBuffers {
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
    valid: bool,
}

impl StreamBuffers {
    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.index_buffer.as_ref()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    fn upload(&mut self, device: &wgpu::Device, label: &str, stream: &VertexStream) {
        if stream.is_empty() {
            self.vertex_buffer = None;
            self.index_buffer = None;
            self.index_count = 0;
            self.valid = true;
            return;
        }

        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&stream.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&stream.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.index_count = stream.indices.len() as u32;
        self.valid = true;
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// GPU-side counterpart of a [`ChunkMesh`]. `compile_to_gpu` re-uploads
/// every stream unconditionally; callers that want partial updates should
/// track per-stream dirtiness on the `ChunkMesh` itself before calling in.
#[derive(Default)]
pub struct ChunkMeshBuffers {
    pub opaque: StreamBuffers,
    pub cutout: StreamBuffers,
    pub translucent: StreamBuffers,
    pub translucent_backface: StreamBuffers,
}

impl ChunkMeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile_to_gpu(&mut self, device: &wgpu::Device, mesh: &ChunkMesh) {
        self.opaque.upload(device, "chunk-opaque", &mesh.opaque);
        self.cutout.upload(device, "chunk-cutout", &mesh.cutout);
        self.translucent.upload(device, "chunk-translucent", &mesh.translucent);
        self.translucent_backface
            .upload(device, "chunk-translucent-backface", &mesh.translucent_backface);
    }

    pub fn invalidate_gpu_data(&mut self) {
        self.opaque.invalidate();
        self.cutout.invalidate();
        self.translucent.invalidate();
        self.translucent_backface.invalidate();
    }

    pub fn is_valid(&self) -> bool {
        self.opaque.is_valid()
            && self.cutout.is_valid()
            && self.translucent.is_valid()
            && self.translucent_backface.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffers_start_invalid() {
        let buffers = ChunkMeshBuffers::new();
        assert!(!buffers.is_valid());
    }

    #[test]
    fn invalidate_clears_valid_flag() {
        let mut buffers = ChunkMeshBuffers::new();
        buffers.opaque.valid = true;
        buffers.cutout.valid = true;
        buffers.translucent.valid = true;
        buffers.translucent_backface.valid = true;
        assert!(buffers.is_valid());
        buffers.invalidate_gpu_data();
        assert!(!buffers.is_valid());
    }
}
