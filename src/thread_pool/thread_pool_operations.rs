//! Free functions that build a [`WorkerPoolData`] and move mesh jobs
//! through it.

use std::sync::Arc;

use crate::error::EngineError;
use crate::error::EngineResult;
use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::core::position::ChunkPos;
use crate::world::mesh::build_mesh;

use super::thread_pool_data::{JobPriority, MeshJobResult, WorkerPoolData};

/// Reserves one thread for the high-priority pool and the rest (at least
/// one) for background work.
pub fn create_worker_pool<B>(total_threads: usize) -> EngineResult<WorkerPoolData<B>>
where
    B: BlockState + Send + Sync + 'static,
{
    let total = total_threads.max(2);
    let high_threads = 1;
    let background_threads = total - high_threads;

    let high_priority_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(high_threads)
        .thread_name(|i| format!("mesh-high-{i}"))
        .build()
        .map_err(|e| EngineError::Internal {
            message: format!("failed to create high-priority worker pool: {e}"),
        })?;
    let background_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(background_threads)
        .thread_name(|i| format!("mesh-bg-{i}"))
        .build()
        .map_err(|e| EngineError::Internal {
            message: format!("failed to create background worker pool: {e}"),
        })?;

    let (result_tx, result_rx) = crossbeam_channel::unbounded();

    Ok(WorkerPoolData {
        high_priority_pool,
        background_pool,
        result_tx,
        result_rx,
    })
}

pub fn default_worker_pool<B>() -> EngineResult<WorkerPoolData<B>>
where
    B: BlockState + Send + Sync + 'static,
{
    create_worker_pool(num_cpus::get())
}

/// Submits a mesh build for `chunk` to the pool. The chunk must stay
/// `Active` for the build's duration (per [`build_mesh`]'s precondition);
/// the job does not itself touch chunk state. Self-cancellation happens
/// because the worker re-checks state on every iteration of the build.
pub fn submit_mesh_job<B>(
    pool: &WorkerPoolData<B>,
    chunk_pos: ChunkPos,
    chunk: Arc<Chunk<B>>,
    priority: JobPriority,
) where
    B: BlockState + Send + Sync + 'static,
{
    let tx = pool.result_tx.clone();
    let job_chunk = chunk;
    let job = move || {
        let mesh = build_mesh(&job_chunk);
        let _ = tx.send(MeshJobResult {
            chunk_pos,
            chunk: job_chunk,
            mesh,
        });
    };

    match priority {
        JobPriority::High => pool.high_priority_pool.spawn(job),
        JobPriority::Normal => pool.background_pool.spawn(job),
    }
}

/// Drains every job that has completed since the last call. Does not block.
pub fn drain_completed_jobs<B>(pool: &WorkerPoolData<B>) -> Vec<MeshJobResult<B>>
where
    B: BlockState,
{
    pool.result_rx.try_iter().collect()
}
