//! Chunk: a fixed 16×16×256 block grid plus its light cache and lifecycle
//! state.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::constants::BLOCKS_PER_CHUNK;
use crate::renderer::mesh_buffers::ChunkMeshBuffers;
use crate::world::core::block_state::BlockState;
use crate::world::core::position::ChunkPos;
use crate::world::light_cache_data::LightCacheData;
use crate::world::light_cache_operations::create_light_cache;
use crate::world::mesh::chunk_mesh::ChunkMesh;

/// `Inactive → Loading → Generating → Active → BuildingMesh → Active →
/// Unloading → Inactive`. Only `Active` (and `BuildingMesh`, transitionally)
/// chunks may be meshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChunkState {
    Inactive = 0,
    Loading = 1,
    Generating = 2,
    Active = 3,
    BuildingMesh = 4,
    Unloading = 5,
}

impl ChunkState {
    fn from_u8(v: u8) -> ChunkState {
        match v {
            0 => ChunkState::Inactive,
            1 => ChunkState::Loading,
            2 => ChunkState::Generating,
            3 => ChunkState::Active,
            4 => ChunkState::BuildingMesh,
            5 => ChunkState::Unloading,
            _ => ChunkState::Inactive,
        }
    }

    /// A chunk is meshable only while it's `Active` or transitionally
    /// `BuildingMesh` (the state the mesh job itself sets while it runs).
    pub fn is_meshable(self) -> bool {
        matches!(self, ChunkState::Active | ChunkState::BuildingMesh)
    }
}

/// Fixed 16×16×256 block grid, indexed by `x | (y<<4) | (z<<8)`.
pub struct Chunk<B: BlockState> {
    pub position: ChunkPos,
    state: AtomicU8,
    mesh_dirty: AtomicBool,
    blocks: RwLock<Vec<Option<Arc<B>>>>,
    light_cache: RwLock<LightCacheData>,
    north: RwLock<Option<Weak<Chunk<B>>>>,
    south: RwLock<Option<Weak<Chunk<B>>>>,
    east: RwLock<Option<Weak<Chunk<B>>>>,
    west: RwLock<Option<Weak<Chunk<B>>>>,
    mesh: RwLock<Option<ChunkMesh>>,
    mesh_buffers: Mutex<ChunkMeshBuffers>,
}

impl<B: BlockState> Chunk<B> {
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            state: AtomicU8::new(ChunkState::Inactive as u8),
            mesh_dirty: AtomicBool::new(false),
            blocks: RwLock::new((0..BLOCKS_PER_CHUNK).map(|_| None).collect()),
            light_cache: RwLock::new(create_light_cache()),
            north: RwLock::new(None),
            south: RwLock::new(None),
            east: RwLock::new(None),
            west: RwLock::new(None),
            mesh: RwLock::new(None),
            mesh_buffers: Mutex::new(ChunkMeshBuffers::new()),
        }
    }

    pub fn state(&self) -> ChunkState {
        ChunkState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: ChunkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn is_meshable(&self) -> bool {
        self.state().is_meshable()
    }

    pub fn mark_mesh_dirty(&self) {
        self.mesh_dirty.store(true, Ordering::Release);
    }

    pub fn take_mesh_dirty(&self) -> bool {
        self.mesh_dirty.swap(false, Ordering::AcqRel)
    }

    pub fn get_block(&self, index: u16) -> Option<Arc<B>> {
        self.blocks.read()[index as usize].clone()
    }

    pub fn set_block(&self, index: u16, block: Option<Arc<B>>) {
        self.blocks.write()[index as usize] = block;
    }

    pub fn with_light_cache<R>(&self, f: impl FnOnce(&LightCacheData) -> R) -> R {
        f(&self.light_cache.read())
    }

    pub fn with_light_cache_mut<R>(&self, f: impl FnOnce(&mut LightCacheData) -> R) -> R {
        f(&mut self.light_cache.write())
    }

    pub fn set_north(&self, neighbor: Option<Weak<Chunk<B>>>) {
        *self.north.write() = neighbor;
    }
    pub fn set_south(&self, neighbor: Option<Weak<Chunk<B>>>) {
        *self.south.write() = neighbor;
    }
    pub fn set_east(&self, neighbor: Option<Weak<Chunk<B>>>) {
        *self.east.write() = neighbor;
    }
    pub fn set_west(&self, neighbor: Option<Weak<Chunk<B>>>) {
        *self.west.write() = neighbor;
    }

    pub fn north(&self) -> Option<Arc<Chunk<B>>> {
        self.north.read().as_ref().and_then(Weak::upgrade)
    }
    pub fn south(&self) -> Option<Arc<Chunk<B>>> {
        self.south.read().as_ref().and_then(Weak::upgrade)
    }
    pub fn east(&self) -> Option<Arc<Chunk<B>>> {
        self.east.read().as_ref().and_then(Weak::upgrade)
    }
    pub fn west(&self) -> Option<Arc<Chunk<B>>> {
        self.west.read().as_ref().and_then(Weak::upgrade)
    }

    /// Stores the freshly built CPU-side mesh, replacing whatever was there.
    pub fn set_mesh(&self, mesh: ChunkMesh) {
        *self.mesh.write() = Some(mesh);
    }

    pub fn with_mesh<R>(&self, f: impl FnOnce(Option<&ChunkMesh>) -> R) -> R {
        f(self.mesh.read().as_ref())
    }

    pub fn with_mesh_buffers_mut<R>(&self, f: impl FnOnce(&mut ChunkMeshBuffers) -> R) -> R {
        f(&mut self.mesh_buffers.lock())
    }

    /// A chunk is meshable only when all four horizontal neighbors are
    /// `Active`.
    pub fn neighbors_active(&self) -> bool {
        [self.north(), self.south(), self.east(), self.west()]
            .iter()
            .all(|n| matches!(n, Some(c) if c.state() == ChunkState::Active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::block_state::{FluidState, RenderShape, RenderType, StaticBlockState};

    fn dummy_block() -> Arc<StaticBlockState> {
        Arc::new(StaticBlockState {
            light_emission: 0,
            light_block: 0,
            propagates_skylight_down: false,
            can_occlude: true,
            is_full_opaque: true,
            same_type_skip: false,
            render_shape: RenderShape::Model,
            render_type: RenderType::Solid,
            render_faces: Default::default(),
            fluid_state: FluidState::empty(),
        })
    }

    #[test]
    fn state_machine_transitions() {
        let chunk: Chunk<StaticBlockState> = Chunk::new(ChunkPos::new(0, 0));
        assert_eq!(chunk.state(), ChunkState::Inactive);
        chunk.set_state(ChunkState::Active);
        assert!(chunk.is_meshable());
        chunk.set_state(ChunkState::Unloading);
        assert!(!chunk.is_meshable());
    }

    #[test]
    fn block_storage_roundtrip() {
        let chunk: Chunk<StaticBlockState> = Chunk::new(ChunkPos::new(0, 0));
        assert!(chunk.get_block(0).is_none());
        chunk.set_block(0, Some(dummy_block()));
        assert!(chunk.get_block(0).is_some());
    }

    #[test]
    fn neighbors_active_requires_all_four() {
        let chunk: Chunk<StaticBlockState> = Chunk::new(ChunkPos::new(0, 0));
        assert!(!chunk.neighbors_active());
        let n = Arc::new(Chunk::new(ChunkPos::new(0, 1)));
        n.set_state(ChunkState::Active);
        chunk.set_north(Some(Arc::downgrade(&n)));
        assert!(!chunk.neighbors_active());
    }
}
