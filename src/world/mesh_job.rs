//! Async Mesh Job: the scheduling glue between a dirty chunk, the worker
//! pool, and the main thread's GPU-upload step.

use std::sync::Arc;

use crate::thread_pool::{self, JobPriority, WorkerPoolData};
use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::core::position::ChunkPos;

/// `{chunkCoords, chunkPointer, priority}`. The result comes back through
/// the pool's completion channel as a
/// [`crate::thread_pool::MeshJobResult`], not inline on this struct.
pub struct AsyncMeshJob<B: BlockState> {
    pub chunk_pos: ChunkPos,
    pub chunk: Arc<Chunk<B>>,
    pub priority: JobPriority,
}

impl<B: BlockState> AsyncMeshJob<B> {
    pub fn new(chunk_pos: ChunkPos, chunk: Arc<Chunk<B>>, priority: JobPriority) -> Self {
        Self {
            chunk_pos,
            chunk,
            priority,
        }
    }
}

/// Submits `job` if the chunk is actually dirty and in a meshable state;
/// a no-op otherwise so callers can call this speculatively every tick.
pub fn schedule<B>(pool: &WorkerPoolData<B>, job: AsyncMeshJob<B>) -> bool
where
    B: BlockState + Send + Sync + 'static,
{
    if !job.chunk.is_meshable() {
        return false;
    }
    if !job.chunk.take_mesh_dirty() {
        return false;
    }
    thread_pool::submit_mesh_job(pool, job.chunk_pos, job.chunk, job.priority);
    true
}

/// Drains every job that finished since the last call, uploads each
/// resulting mesh to the GPU (§[`crate::renderer::mesh_buffers`]), and
/// assigns it to the chunk. Aborted builds (`mesh = None`) re-mark the
/// chunk dirty so the next activity event retries them. Returns the number
/// of meshes successfully applied.
pub fn apply_completed_jobs<B>(pool: &WorkerPoolData<B>, device: &wgpu::Device) -> usize
where
    B: BlockState,
{
    let mut applied = 0;
    for result in thread_pool::drain_completed_jobs(pool) {
        match result.mesh {
            Some(mesh) => {
                result.chunk.with_mesh_buffers_mut(|buffers| buffers.compile_to_gpu(device, &mesh));
                result.chunk.set_mesh(mesh);
                applied += 1;
            }
            None => {
                log::debug!(
                    "mesh job for chunk ({}, {}) aborted, re-marking dirty",
                    result.chunk_pos.x,
                    result.chunk_pos.y
                );
                result.chunk.mark_mesh_dirty();
            }
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::ChunkState;
    use crate::world::core::block_state::StaticBlockState;

    #[test]
    fn schedule_skips_non_meshable_chunk() {
        let pool = thread_pool::default_worker_pool::<StaticBlockState>().unwrap();
        let chunk = Arc::new(Chunk::new(ChunkPos::new(0, 0)));
        chunk.mark_mesh_dirty();
        let job = AsyncMeshJob::new(ChunkPos::new(0, 0), chunk, JobPriority::Normal);
        assert!(!schedule(&pool, job));
    }

    #[test]
    fn schedule_skips_chunk_that_is_not_dirty() {
        let pool = thread_pool::default_worker_pool::<StaticBlockState>().unwrap();
        let chunk = Arc::new(Chunk::new(ChunkPos::new(0, 0)));
        chunk.set_state(ChunkState::Active);
        let job = AsyncMeshJob::new(ChunkPos::new(0, 0), chunk, JobPriority::Normal);
        assert!(!schedule(&pool, job));
    }
}
