//! Worker pool data: a `rayon` pool plus the channel completed mesh jobs
//! report back on. Construction and submission live in
//! [`super::thread_pool_operations`].

use std::sync::Arc;

use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::core::position::ChunkPos;
use crate::world::mesh::chunk_mesh::ChunkMesh;

/// Named task categories a job can be submitted under. Both currently share
/// the same underlying `rayon` pools; the category exists so call sites and
/// logs can distinguish mesh rebuilds from chunk generation at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCategory {
    MeshBuilding,
    ChunkGen,
}

/// Player-interaction-triggered rebuilds are `High`; background rebuilds
/// (e.g. a neighbor finishing load) are `Normal`. `rayon`'s work-stealing
/// queue has no native priority concept, so `High` jobs go to a small
/// dedicated pool that drains ahead of the larger background pool under
/// contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPriority {
    High,
    Normal,
}

/// Result of one completed mesh job. `mesh = None` means the build aborted
/// (chunk or a neighbor left `Active` mid-build) and the caller should
/// requeue on the next chunk-activity event.
pub struct MeshJobResult<B: BlockState> {
    pub chunk_pos: ChunkPos,
    pub chunk: Arc<Chunk<B>>,
    pub mesh: Option<ChunkMesh>,
}

pub struct WorkerPoolData<B: BlockState> {
    pub(super) high_priority_pool: rayon::ThreadPool,
    pub(super) background_pool: rayon::ThreadPool,
    pub(super) result_tx: crossbeam_channel::Sender<MeshJobResult<B>>,
    pub(super) result_rx: crossbeam_channel::Receiver<MeshJobResult<B>>,
}
