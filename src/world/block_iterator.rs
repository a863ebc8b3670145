//! Bit-Packed Block Iterator: encodes `(x, y, z)` into one `u16` index and
//! walks neighbors across chunk boundaries using only bitwise
//! AND/OR/shift — no division or modulo.

use std::sync::Arc;

use crate::world::chunk::Chunk;
use crate::world::core::block_state::BlockState;
use crate::world::core::direction::Direction;

const MASK_X: u16 = 0x000F;
const MASK_Y: u16 = 0x00F0;
const MASK_Z_TOP: u16 = 0xFF00;

/// A cursor into a chunk's block grid. Does not store chunk pointers
/// permanently beyond the one it currently references: crossing a chunk
/// boundary re-resolves the neighbor chunk via the current chunk's
/// neighbor links.
pub struct BlockIterator<B: BlockState> {
    chunk: Option<Arc<Chunk<B>>>,
    index: u16,
}

// `Arc<Chunk<B>>` is `Clone` regardless of `B`; a derived `Clone` would
// wrongly require `B: Clone` too, which most `BlockState` impls won't have.
impl<B: BlockState> Clone for BlockIterator<B> {
    fn clone(&self) -> Self {
        Self {
            chunk: self.chunk.clone(),
            index: self.index,
        }
    }
}

impl<B: BlockState> BlockIterator<B> {
    pub fn new(chunk: Arc<Chunk<B>>, index: u16) -> Self {
        Self {
            chunk: Some(chunk),
            index,
        }
    }

    pub fn invalid() -> Self {
        Self {
            chunk: None,
            index: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.chunk.is_some()
    }

    pub fn chunk(&self) -> Option<&Arc<Chunk<B>>> {
        self.chunk.as_ref()
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    fn x(&self) -> u16 {
        self.index & MASK_X
    }
    fn y(&self) -> u16 {
        (self.index & MASK_Y) >> 4
    }
    fn z(&self) -> u16 {
        (self.index & MASK_Z_TOP) >> 8
    }

    pub fn block(&self) -> Option<Arc<B>> {
        self.chunk.as_ref()?.get_block(self.index)
    }

    /// Computes the neighboring iterator in `dir`, crossing chunk
    /// boundaries by resolving the current chunk's neighbor link.
    pub fn get_neighbor(&self, dir: Direction) -> BlockIterator<B> {
        let Some(chunk) = &self.chunk else {
            return BlockIterator::invalid();
        };

        match dir {
            Direction::North => {
                if self.y() == 15 {
                    match chunk.north() {
                        Some(n) => BlockIterator {
                            chunk: Some(n),
                            index: self.index & !MASK_Y,
                        },
                        None => BlockIterator::invalid(),
                    }
                } else {
                    BlockIterator {
                        chunk: Some(chunk.clone()),
                        index: (self.index & !MASK_Y) | ((self.y() + 1) << 4),
                    }
                }
            }
            Direction::South => {
                if self.y() == 0 {
                    match chunk.south() {
                        Some(n) => BlockIterator {
                            chunk: Some(n),
                            index: self.index | MASK_Y,
                        },
                        None => BlockIterator::invalid(),
                    }
                } else {
                    BlockIterator {
                        chunk: Some(chunk.clone()),
                        index: (self.index & !MASK_Y) | ((self.y() - 1) << 4),
                    }
                }
            }
            Direction::East => {
                if self.x() == 15 {
                    match chunk.east() {
                        Some(n) => BlockIterator {
                            chunk: Some(n),
                            index: self.index & !MASK_X,
                        },
                        None => BlockIterator::invalid(),
                    }
                } else {
                    BlockIterator {
                        chunk: Some(chunk.clone()),
                        index: self.index + 1,
                    }
                }
            }
            Direction::West => {
                if self.x() == 0 {
                    match chunk.west() {
                        Some(n) => BlockIterator {
                            chunk: Some(n),
                            index: self.index | MASK_X,
                        },
                        None => BlockIterator::invalid(),
                    }
                } else {
                    BlockIterator {
                        chunk: Some(chunk.clone()),
                        index: self.index - 1,
                    }
                }
            }
            Direction::Up => {
                if self.z() == 255 {
                    BlockIterator::invalid()
                } else {
                    BlockIterator {
                        chunk: Some(chunk.clone()),
                        index: self.index + (1 << 8),
                    }
                }
            }
            Direction::Down => {
                if self.z() == 0 {
                    BlockIterator::invalid()
                } else {
                    BlockIterator {
                        chunk: Some(chunk.clone()),
                        index: self.index - (1 << 8),
                    }
                }
            }
        }
    }

    /// All six neighbors in the fixed order `[N, S, E, W, U, D]`.
    pub fn get_neighbors(&self) -> [BlockIterator<B>; 6] {
        [
            self.get_neighbor(Direction::North),
            self.get_neighbor(Direction::South),
            self.get_neighbor(Direction::East),
            self.get_neighbor(Direction::West),
            self.get_neighbor(Direction::Up),
            self.get_neighbor(Direction::Down),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::block_state::StaticBlockState;
    use crate::world::core::position::ChunkPos;

    fn chunk() -> Arc<Chunk<StaticBlockState>> {
        Arc::new(Chunk::new(ChunkPos::new(0, 0)))
    }

    #[test]
    fn neighbor_crossing_is_bijective_within_chunk() {
        let c = chunk();
        let iter = BlockIterator::new(c, local(5, 5, 5));
        for dir in Direction::ALL {
            let neighbor = iter.get_neighbor(dir);
            assert!(neighbor.is_valid());
            let back = neighbor.get_neighbor(dir.opposite());
            assert_eq!(back.index(), iter.index());
        }
    }

    #[test]
    fn up_at_world_top_is_invalid() {
        let c = chunk();
        let iter = BlockIterator::new(c, local(0, 0, 255));
        assert!(!iter.get_neighbor(Direction::Up).is_valid());
    }

    #[test]
    fn down_at_world_bottom_is_invalid() {
        let c = chunk();
        let iter = BlockIterator::new(c, local(0, 0, 0));
        assert!(!iter.get_neighbor(Direction::Down).is_valid());
    }

    #[test]
    fn crossing_boundary_without_neighbor_chunk_is_invalid() {
        let c = chunk();
        let iter = BlockIterator::new(c, local(15, 0, 0));
        assert!(!iter.get_neighbor(Direction::East).is_valid());
    }

    #[test]
    fn crossing_boundary_into_linked_neighbor_preserves_other_axes() {
        let a = chunk();
        let b: Arc<Chunk<StaticBlockState>> = Arc::new(Chunk::new(ChunkPos::new(1, 0)));
        a.set_east(Some(Arc::downgrade(&b)));
        let iter = BlockIterator::new(a, local(15, 3, 64));
        let crossed = iter.get_neighbor(Direction::East);
        assert!(crossed.is_valid());
        assert_eq!(crossed.x(), 0);
        assert_eq!(crossed.y(), 3);
        assert_eq!(crossed.z(), 64);
    }

    fn local(x: u16, y: u16, z: u16) -> u16 {
        crate::world::light_cache_operations::local_index(x, y, z)
    }
}
