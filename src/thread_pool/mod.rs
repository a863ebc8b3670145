//! Background worker pool for chunk mesh jobs (§[`crate::world::mesh_job`]).

pub mod thread_pool_data;
pub mod thread_pool_operations;

pub use thread_pool_data::{JobCategory, JobPriority, MeshJobResult, WorkerPoolData};
pub use thread_pool_operations::{create_worker_pool, default_worker_pool, drain_completed_jobs, submit_mesh_job};
