//! Renderer module: per-vertex terrain layout, the generic N-way buffer
//! flip state machine, the render-target and shadow-target managers built
//! on it, and the GPU upload step for chunk meshes.

pub mod flip_state;
pub mod mesh_buffers;
pub mod render_target;
pub mod shadow_target;
pub mod vertex;

pub use flip_state::{BufferFlipState, RenderTargetFlipState, ShadowFlipState};
pub use mesh_buffers::{ChunkMeshBuffers, StreamBuffers};
pub use render_target::{
    LoadAction, MipmapGenerator, RenderTarget, RenderTargetDesc, RenderTargetManager,
    RenderTargetsBuffer,
};
pub use shadow_target::ShadowRenderTargetManager;
pub use vertex::TerrainVertex;
