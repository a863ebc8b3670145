//! Block light channel: emission-sourced light that attenuates with
//! distance through non-opaque blocks.

use crate::constants::MAX_LIGHT_LEVEL;
use crate::world::block_iterator::BlockIterator;
use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::light_cache_operations::{get_block_light, set_block_light};
use crate::world::lighting::light_engine::LightChannel;

pub struct BlockLightChannel;

impl<B: BlockState> LightChannel<B> for BlockLightChannel {
    fn get_current(&self, chunk: &Chunk<B>, index: u16) -> u8 {
        chunk.with_light_cache(|cache| get_block_light(cache, index))
    }

    fn set_current(&self, chunk: &Chunk<B>, index: u16, value: u8) {
        chunk.with_light_cache_mut(|cache| set_block_light(cache, index, value));
    }

    fn compute_correct(&self, iter: &BlockIterator<B>) -> u8 {
        if !iter.is_valid() {
            return 0;
        }
        let block = iter.block();
        let emission = block.as_ref().map(|b| b.light_emission()).unwrap_or(0);
        let light_block = block.as_ref().map(|b| b.light_block()).unwrap_or(0);
        if light_block >= MAX_LIGHT_LEVEL {
            return emission;
        }
        let attenuation = light_block.max(1);
        let mut best_neighbor = 0u8;
        for neighbor in iter.get_neighbors() {
            if !neighbor.is_valid() {
                continue;
            }
            let Some(nchunk) = neighbor.chunk() else {
                continue;
            };
            let n = nchunk.with_light_cache(|cache| get_block_light(cache, neighbor.index()));
            if n > attenuation {
                best_neighbor = best_neighbor.max(n - attenuation);
            }
        }
        emission.max(best_neighbor)
    }
}
