//! Chunk mesh storage: one vertex/index stream per render pass, plus the
//! optional translucent-backface stream for the underwater water-surface
//! view.

use crate::renderer::vertex::TerrainVertex;

/// One `{vertices, indices, dirty}` stream. `dirty` is set whenever the CPU
/// data changes and cleared by [`crate::renderer::mesh_buffers::ChunkMeshBuffers::compile_to_gpu`]
/// after upload.
#[derive(Debug, Clone, Default)]
pub struct VertexStream {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    pub dirty: bool,
}

impl VertexStream {
    pub fn reserve_quads(&mut self, quads: usize) {
        self.vertices.reserve(quads * 4);
        self.indices.reserve(quads * 6);
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends one quad. `flip` picks the `(1,2,3),(1,3,0)` diagonal split
    /// instead of the default `(0,1,2),(0,2,3)`. `reversed` emits the
    /// opposite winding order (used for the water backface, so the quad is
    /// visible from the other side).
    pub fn push_quad(&mut self, quad: [TerrainVertex; 4], flip: bool, reversed: bool) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&quad);

        let tris: [[u32; 3]; 2] = match (flip, reversed) {
            (false, false) => [[0, 1, 2], [0, 2, 3]],
            (true, false) => [[1, 2, 3], [1, 3, 0]],
            (false, true) => [[0, 2, 1], [0, 3, 2]],
            (true, true) => [[1, 3, 2], [1, 0, 3]],
        };
        for tri in tris {
            self.indices.push(base + tri[0]);
            self.indices.push(base + tri[1]);
            self.indices.push(base + tri[2]);
        }
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.dirty = true;
    }
}

/// Three independent vertex/index streams (opaque / cutout / translucent)
/// plus one optional translucent-backface stream, built fresh each time a
/// chunk's geometry changes.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    pub opaque: VertexStream,
    pub cutout: VertexStream,
    pub translucent: VertexStream,
    pub translucent_backface: VertexStream,
}

impl ChunkMesh {
    pub fn reserve(&mut self, opaque_quads: usize, cutout_quads: usize, translucent_quads: usize) {
        self.opaque.reserve_quads(opaque_quads);
        self.cutout.reserve_quads(cutout_quads);
        self.translucent.reserve_quads(translucent_quads);
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty()
            && self.cutout.is_empty()
            && self.translucent.is_empty()
            && self.translucent_backface.is_empty()
    }

    pub fn has_opaque_geometry(&self) -> bool {
        !self.opaque.is_empty()
    }

    pub fn has_cutout_geometry(&self) -> bool {
        !self.cutout.is_empty()
    }

    pub fn has_translucent_geometry(&self) -> bool {
        !self.translucent.is_empty() || !self.translucent_backface.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex() -> TerrainVertex {
        TerrainVertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0], [255, 255, 255, 255])
    }

    #[test]
    fn push_quad_emits_four_vertices_and_six_indices() {
        let mut stream = VertexStream::default();
        stream.push_quad([vertex(); 4], false, false);
        assert_eq!(stream.vertices.len(), 4);
        assert_eq!(stream.indices.len(), 6);
        assert_eq!(stream.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn flip_changes_diagonal_split() {
        let mut stream = VertexStream::default();
        stream.push_quad([vertex(); 4], true, false);
        assert_eq!(stream.indices, vec![1, 2, 3, 1, 3, 0]);
    }

    #[test]
    fn reversed_winding_swaps_last_two_indices_per_triangle() {
        let mut stream = VertexStream::default();
        stream.push_quad([vertex(); 4], false, true);
        assert_eq!(stream.indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn successive_quads_offset_indices_by_four() {
        let mut stream = VertexStream::default();
        stream.push_quad([vertex(); 4], false, false);
        stream.push_quad([vertex(); 4], false, false);
        assert_eq!(stream.indices[6..], [4, 5, 6, 4, 6, 7]);
    }
}
