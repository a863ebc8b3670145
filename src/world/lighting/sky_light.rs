//! Sky light channel: 15 in open-sky columns, propagating downward with
//! attenuation except through blocks that explicitly pass skylight
//! straight through (glass, leaves).

use crate::constants::MAX_LIGHT_LEVEL;
use crate::world::block_iterator::BlockIterator;
use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::core::direction::Direction;
use crate::world::light_cache_operations::{get_is_sky, get_sky_light, set_sky_light};
use crate::world::lighting::light_engine::LightChannel;

pub struct SkyLightChannel;

impl<B: BlockState> LightChannel<B> for SkyLightChannel {
    fn get_current(&self, chunk: &Chunk<B>, index: u16) -> u8 {
        chunk.with_light_cache(|cache| get_sky_light(cache, index))
    }

    fn set_current(&self, chunk: &Chunk<B>, index: u16, value: u8) {
        chunk.with_light_cache_mut(|cache| set_sky_light(cache, index, value));
    }

    fn compute_correct(&self, iter: &BlockIterator<B>) -> u8 {
        let Some(chunk) = iter.chunk() else {
            return 0;
        };
        if chunk.with_light_cache(|cache| get_is_sky(cache, iter.index())) {
            return MAX_LIGHT_LEVEL;
        }

        let block = iter.block();
        let light_block = block.as_ref().map(|b| b.light_block()).unwrap_or(0);
        if light_block >= MAX_LIGHT_LEVEL {
            return 0;
        }
        let propagates_down = block.as_ref().map(|b| b.propagates_skylight_down()).unwrap_or(true);
        let attenuation = light_block.max(1);

        let mut best = 0u8;
        for dir in Direction::ALL {
            let neighbor = iter.get_neighbor(dir);
            if !neighbor.is_valid() {
                continue;
            }
            let Some(nchunk) = neighbor.chunk() else {
                continue;
            };
            let n = nchunk.with_light_cache(|cache| get_sky_light(cache, neighbor.index()));
            if n == 0 {
                continue;
            }
            let candidate = if dir == Direction::Up && propagates_down && n == MAX_LIGHT_LEVEL {
                MAX_LIGHT_LEVEL
            } else if n > attenuation {
                n - attenuation
            } else {
                0
            };
            best = best.max(candidate);
        }
        best
    }
}
