//! Coordinate types, direction/face-normal tables, and the `BlockState`
//! external-collaborator contract.

pub mod block_state;
pub mod direction;
pub mod position;

pub use block_state::{BlockState, FluidState, RenderFace, RenderShape, RenderType, StaticBlockState};
pub use direction::Direction;
pub use position::{BlockPos, ChunkPos};
