//! Buffer-Flip State: a fixed-N bitset giving each of N double-buffered
//! targets a current `{Main, Alt}` polarity.

use bit_vec::BitVec;

use crate::constants::{RENDER_TARGET_FLIP_COUNT, SHADOW_FLIP_COUNT};

/// `IsFlipped(i) == false` means "reads Main, writes Alt"; `true` means
/// the reverse. Pure data, no I/O.
#[derive(Debug, Clone)]
pub struct BufferFlipState<const N: usize> {
    bits: BitVec,
}

impl<const N: usize> BufferFlipState<N> {
    pub fn new() -> Self {
        Self {
            bits: BitVec::from_elem(N, false),
        }
    }

    pub fn is_flipped(&self, i: usize) -> bool {
        self.bits[i]
    }

    /// Toggles bit `i`.
    pub fn flip(&mut self, i: usize) {
        let cur = self.bits[i];
        self.bits.set(i, !cur);
    }

    /// Toggles every bit. The canonical end-of-frame operation.
    pub fn flip_all(&mut self) {
        for i in 0..N {
            let cur = self.bits[i];
            self.bits.set(i, !cur);
        }
    }

    pub fn reset(&mut self) {
        self.bits = BitVec::from_elem(N, false);
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Packs the bitset into a `u64`; bit 0 (LSB) corresponds to index 0.
    /// Use [`Self::to_u16`] or [`Self::to_u32`] for the narrower views the
    /// GPU-facing buffers actually store.
    pub fn to_uint(&self) -> u64 {
        let mut value: u64 = 0;
        for i in 0..N {
            if self.bits[i] {
                value |= 1u64 << i;
            }
        }
        value
    }

    pub fn to_u16(&self) -> u16 {
        const { assert!(N <= 16) };
        self.to_uint() as u16
    }

    pub fn to_u32(&self) -> u32 {
        const { assert!(N <= 32) };
        self.to_uint() as u32
    }
}

impl<const N: usize> Default for BufferFlipState<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Flip state for up to 16 render targets.
pub type RenderTargetFlipState = BufferFlipState<RENDER_TARGET_FLIP_COUNT>;
/// Flip state for up to 8 shadow color targets.
pub type ShadowFlipState = BufferFlipState<SHADOW_FLIP_COUNT>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_toggles_and_is_self_inverse() {
        let mut state: RenderTargetFlipState = BufferFlipState::new();
        assert!(!state.is_flipped(3));
        state.flip(3);
        assert!(state.is_flipped(3));
        state.flip(3);
        assert!(!state.is_flipped(3));
    }

    #[test]
    fn flip_all_toggles_every_bit() {
        let mut state: RenderTargetFlipState = BufferFlipState::new();
        state.flip(0);
        state.flip_all();
        assert!(!state.is_flipped(0));
        for i in 1..16 {
            assert!(state.is_flipped(i));
        }
    }

    #[test]
    fn reset_clears_all_bits() {
        let mut state: RenderTargetFlipState = BufferFlipState::new();
        state.flip_all();
        state.reset();
        for i in 0..16 {
            assert!(!state.is_flipped(i));
        }
    }

    #[test]
    fn to_uint_lsb_is_index_zero() {
        let mut state: BufferFlipState<4> = BufferFlipState::new();
        state.flip(0);
        state.flip(2);
        assert_eq!(state.to_uint(), 0b0101);
    }
}
