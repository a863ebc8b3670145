//! Chunk mesh build pipeline: ambient occlusion, the two-pass builder, and
//! the CPU-side mesh storage it produces.

pub mod ao;
pub mod chunk_mesh;
pub mod mesh_builder;

pub use chunk_mesh::{ChunkMesh, VertexStream};
pub use mesh_builder::build_mesh;
