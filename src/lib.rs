//! Voxel rendering engine core: bindless GPU descriptor management, the
//! render-target flip manager, the dual-channel voxel light engine, and the
//! chunk mesh build pipeline.
//!
//! Terrain generation, windowing, networking, and the shader graph above the
//! G-buffer live outside this crate; see [`world::chunk::Chunk`] for the
//! boundary this core expects its caller to populate.

pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod renderer;
pub mod thread_pool;
pub mod world;

pub use config::{EngineConfig, GpuConfig, WorkerPoolConfig};
pub use error::{EngineError, EngineResult, ErrorContext, OptionExt};
