//! Composite Light Engine: owns one sky and one block channel engine and
//! answers combined brightness queries.

use std::sync::Arc;

use crate::error::EngineResult;
use crate::world::block_iterator::BlockIterator;
use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::lighting::block_light::BlockLightChannel;
use crate::world::lighting::light_engine::LightEngine;
use crate::world::lighting::sky_light::SkyLightChannel;

pub struct CompositeLightEngine<B: BlockState> {
    block_engine: LightEngine<B, BlockLightChannel>,
    sky_engine: LightEngine<B, SkyLightChannel>,
}

impl<B: BlockState> CompositeLightEngine<B> {
    pub fn new() -> Self {
        Self {
            block_engine: LightEngine::new(BlockLightChannel),
            sky_engine: LightEngine::new(SkyLightChannel),
        }
    }

    pub fn block_engine(&self) -> &LightEngine<B, BlockLightChannel> {
        &self.block_engine
    }

    pub fn block_engine_mut(&mut self) -> &mut LightEngine<B, BlockLightChannel> {
        &mut self.block_engine
    }

    pub fn sky_engine(&self) -> &LightEngine<B, SkyLightChannel> {
        &self.sky_engine
    }

    pub fn sky_engine_mut(&mut self) -> &mut LightEngine<B, SkyLightChannel> {
        &mut self.sky_engine
    }

    pub fn mark_dirty(&mut self, iter: BlockIterator<B>) {
        self.block_engine.mark_dirty(iter.clone());
        self.sky_engine.mark_dirty(iter);
    }

    /// Drains the block queue to exhaustion, then the sky queue. Order
    /// matters: block light is independent of sky, but combined queries
    /// should see final sky values.
    pub fn run_light_updates(&mut self) -> EngineResult<()> {
        self.block_engine.process_dirty_queue()?;
        self.sky_engine.process_dirty_queue()?;
        Ok(())
    }

    pub fn get_sky_light(&self, iter: &BlockIterator<B>) -> u8 {
        self.sky_engine.get_light_value(iter)
    }

    pub fn get_block_light(&self, iter: &BlockIterator<B>) -> u8 {
        self.block_engine.get_light_value(iter)
    }

    pub fn get_raw_brightness(&self, iter: &BlockIterator<B>, sky_darken: u8) -> u8 {
        let sky = self.get_sky_light(iter).saturating_sub(sky_darken);
        let block = self.get_block_light(iter);
        sky.max(block)
    }

    pub fn undirty_all_blocks_in_chunk(&mut self, chunk: &Arc<Chunk<B>>) {
        self.block_engine.undirty_all_blocks_in_chunk(chunk);
        self.sky_engine.undirty_all_blocks_in_chunk(chunk);
    }
}

impl<B: BlockState> Default for CompositeLightEngine<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::block_iterator::BlockIterator;
    use crate::world::core::block_state::{FluidState, RenderShape, RenderType, StaticBlockState};
    use crate::world::core::position::ChunkPos;
    use crate::world::light_cache_operations::local_index;

    fn air_column_chunk(light_block: u8, propagates_down: bool) -> Arc<Chunk<StaticBlockState>> {
        let _ = (light_block, propagates_down);
        Arc::new(Chunk::new(ChunkPos::new(0, 0)))
    }

    fn solid_block(light_block: u8, propagates_down: bool, emission: u8) -> Arc<StaticBlockState> {
        Arc::new(StaticBlockState {
            light_emission: emission,
            light_block,
            propagates_skylight_down: propagates_down,
            can_occlude: light_block >= 15,
            is_full_opaque: light_block >= 15,
            same_type_skip: false,
            render_shape: RenderShape::Model,
            render_type: RenderType::Solid,
            render_faces: Default::default(),
            fluid_state: FluidState::empty(),
        })
    }

    #[test]
    fn scenario_s1_single_torch_in_air_pocket() {
        // A long vertical air column standing in for "a 3x3x3 air pocket
        // and beyond": distance is what matters to BlockLightEngine, not
        // the pocket's exact shape, so a 1D column exercises the same
        // attenuation chain.
        let chunk = air_column_chunk(0, true);
        let torch_z = 0u16;
        let torch_index = local_index(0, 0, torch_z);
        chunk.set_block(torch_index, Some(solid_block(0, true, 14)));

        let mut engine = CompositeLightEngine::<StaticBlockState>::new();
        engine
            .block_engine_mut()
            .mark_dirty(BlockIterator::new(chunk.clone(), torch_index));
        engine.run_light_updates().unwrap();

        let get = |z: u16| {
            let iter = BlockIterator::new(chunk.clone(), local_index(0, 0, z));
            engine.get_block_light(&iter)
        };
        assert_eq!(get(0), 14);
        assert_eq!(get(1), 13);
        assert_eq!(get(7), 7);
        assert_eq!(get(14), 0);
    }

    #[test]
    fn scenario_s2_opaque_ceiling_blocks_sky() {
        let chunk = Arc::new(Chunk::<StaticBlockState>::new(ChunkPos::new(0, 0)));
        // sky column from z=65..=255, ceiling at z=64, open air z=0..=63
        chunk.with_light_cache_mut(|cache| {
            for z in 65u16..=255 {
                crate::world::light_cache_operations::set_is_sky(cache, local_index(0, 0, z), true);
                crate::world::light_cache_operations::set_sky_light(cache, local_index(0, 0, z), 15);
            }
        });
        chunk.set_block(local_index(0, 0, 64), Some(solid_block(15, false, 0)));

        let mut engine = CompositeLightEngine::<StaticBlockState>::new();
        for z in 0u16..=64 {
            engine
                .sky_engine_mut()
                .mark_dirty(BlockIterator::new(chunk.clone(), local_index(0, 0, z)));
        }
        engine.run_light_updates().unwrap();

        let get = |z: u16| {
            let iter = BlockIterator::new(chunk.clone(), local_index(0, 0, z));
            engine.get_sky_light(&iter)
        };
        assert_eq!(get(64), 0);
        assert_eq!(get(0), 0);
        assert_eq!(get(63), 0);
    }
}
