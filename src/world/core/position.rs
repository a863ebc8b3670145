//! World↔chunk↔local coordinate conversions.

use crate::constants::{CHUNK_BITS_X, CHUNK_BITS_Y, CHUNK_MASK_X, CHUNK_MASK_Y};

/// Signed world-integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk this position falls in. There is no vertical chunk index:
    /// chunks span the full Z build height.
    pub fn chunk_pos(self) -> ChunkPos {
        ChunkPos {
            x: self.x >> CHUNK_BITS_X,
            y: self.y >> CHUNK_BITS_Y,
        }
    }

    /// Local `(x, y, z)` within its chunk, each masked to chunk bounds.
    pub fn local(self) -> (u16, u16, u16) {
        (
            (self.x as u32 & CHUNK_MASK_X as u32) as u16,
            (self.y as u32 & CHUNK_MASK_Y as u32) as u16,
            self.z as u16,
        )
    }
}

/// Horizontal chunk coordinate (no Z component: one chunk spans the full
/// build height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
}

impl ChunkPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbor(self, dx: i32, dy: i32) -> ChunkPos {
        ChunkPos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_pos_follows_sign() {
        assert_eq!(BlockPos::new(0, 0, 0).chunk_pos(), ChunkPos::new(0, 0));
        assert_eq!(BlockPos::new(15, 15, 0).chunk_pos(), ChunkPos::new(0, 0));
        assert_eq!(BlockPos::new(16, 0, 0).chunk_pos(), ChunkPos::new(1, 0));
        assert_eq!(BlockPos::new(-1, 0, 0).chunk_pos(), ChunkPos::new(-1, 0));
    }

    #[test]
    fn local_coords_mask_correctly() {
        assert_eq!(BlockPos::new(17, 33, 5).local(), (1, 1, 5));
        assert_eq!(BlockPos::new(-1, -1, 0).local(), (15, 15, 0));
    }
}
