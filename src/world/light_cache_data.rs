//! Dual-Channel Light Cache data. NO METHODS. Just data.
//!
//! Per-block byte storage plus two per-block bit arrays, sharing the
//! owning chunk's lifetime. See `light_cache_operations` for every
//! accessor.

use bit_vec::BitVec;

#[derive(Debug, Clone)]
pub struct LightCacheData {
    /// `sky<<4 | block` per block.
    pub light: Vec<u8>,
    /// True for blocks above the highest opaque block in their column.
    pub is_sky: BitVec,
    /// True while the block is pending in a light-engine dirty queue.
    pub is_dirty: BitVec,
}
