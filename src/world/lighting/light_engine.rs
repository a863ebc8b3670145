//! Shared BFS dirty-queue machinery used by both the sky and block light
//! channels.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::constants::BLOCKS_PER_CHUNK;
use crate::error::EngineResult;
use crate::world::block_iterator::BlockIterator;
use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::light_cache_operations::{get_is_dirty, set_is_dirty};

/// Per-channel strategy: how to read/write the stored light value and how
/// to recompute the "correct" value for a block from its neighbors.
pub trait LightChannel<B: BlockState> {
    fn get_current(&self, chunk: &Chunk<B>, index: u16) -> u8;
    fn set_current(&self, chunk: &Chunk<B>, index: u16, value: u8);
    fn compute_correct(&self, iter: &BlockIterator<B>) -> u8;
}

fn effective_is_full_opaque<B: BlockState>(block: Option<&Arc<B>>) -> bool {
    block.map(|b| b.is_full_opaque()).unwrap_or(false)
}

/// Owns a FIFO dirty queue and drains it against one `LightChannel`.
pub struct LightEngine<B: BlockState, C: LightChannel<B>> {
    dirty_queue: VecDeque<BlockIterator<B>>,
    channel: C,
}

impl<B: BlockState, C: LightChannel<B>> LightEngine<B, C> {
    pub fn new(channel: C) -> Self {
        Self {
            dirty_queue: VecDeque::new(),
            channel,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn get_light_value(&self, iter: &BlockIterator<B>) -> u8 {
        match iter.chunk() {
            Some(chunk) => self.channel.get_current(chunk, iter.index()),
            None => 0,
        }
    }

    /// No-op if the block's dirty bit is already set (deduplication).
    pub fn mark_dirty(&mut self, iter: BlockIterator<B>) {
        if !iter.is_valid() {
            return;
        }
        let Some(chunk) = iter.chunk().cloned() else {
            return;
        };
        let already_dirty = chunk.with_light_cache(|cache| get_is_dirty(cache, iter.index()));
        if already_dirty {
            return;
        }
        chunk.with_light_cache_mut(|cache| set_is_dirty(cache, iter.index(), true));
        self.dirty_queue.push_back(iter);
    }

    pub fn mark_dirty_if_not_opaque(&mut self, iter: BlockIterator<B>) {
        if !iter.is_valid() {
            return;
        }
        if effective_is_full_opaque(iter.block().as_ref()) {
            return;
        }
        self.mark_dirty(iter);
    }

    /// Drains the dirty queue to exhaustion. Must fully converge before
    /// the next frame's mesh build starts.
    pub fn process_dirty_queue(&mut self) -> EngineResult<()> {
        while let Some(iter) = self.dirty_queue.pop_front() {
            if !iter.is_valid() {
                log::warn!("light engine: skipping invalid block iterator in dirty queue");
                continue;
            }
            let Some(chunk) = iter.chunk().cloned() else {
                continue;
            };
            chunk.with_light_cache_mut(|cache| set_is_dirty(cache, iter.index(), false));

            let correct = self.channel.compute_correct(&iter);
            let current = self.channel.get_current(&chunk, iter.index());
            if correct != current {
                self.channel.set_current(&chunk, iter.index(), correct);
                chunk.mark_mesh_dirty();

                for neighbor in iter.get_neighbors() {
                    if !neighbor.is_valid() {
                        continue;
                    }
                    if effective_is_full_opaque(neighbor.block().as_ref()) {
                        continue;
                    }
                    if let Some(neighbor_chunk) = neighbor.chunk().cloned() {
                        if !Arc::ptr_eq(&neighbor_chunk, &chunk) {
                            neighbor_chunk.mark_mesh_dirty();
                        }
                    }
                    self.mark_dirty(neighbor);
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirty_queue.len()
    }

    /// Scrubs the queue when a chunk unloads.
    pub fn undirty_all_blocks_in_chunk(&mut self, chunk: &Arc<Chunk<B>>) {
        self.dirty_queue.retain(|iter| match iter.chunk() {
            Some(c) => !Arc::ptr_eq(c, chunk),
            None => true,
        });
        chunk.with_light_cache_mut(|cache| {
            for i in 0..BLOCKS_PER_CHUNK as u32 {
                set_is_dirty(cache, i as u16, false);
            }
        });
    }
}
