//! Descriptor Heap Allocator: owns the four GPU-resource-descriptor heaps
//! (shader-visible CBV/SRV/UAV, offline RTV/DSV/Sampler) and hands out
//! stable integer indices into them.
//!
//! `wgpu` has no literal descriptor-heap concept (resources are bound per
//! draw via `BindGroup`s), so this allocator is the bookkeeping layer that
//! owns the *indices* bindless code relies on; `set_descriptor_heaps` is
//! kept for interface parity with the command-list contract but is a no-op
//! on this backend since wgpu has nothing to bind ahead of a draw.

use bit_vec::BitVec;
use parking_lot::Mutex;

use crate::constants::descriptor_heap_defaults;
use crate::error::{EngineError, EngineResult};

/// The four kinds of descriptor heap a D3D12-style backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapType {
    /// Shader-visible constant-buffer / shader-resource / unordered-access heap.
    CbvSrvUav,
    /// Offline render-target-view heap.
    Rtv,
    /// Offline depth-stencil-view heap.
    Dsv,
    /// Offline sampler heap.
    Sampler,
}

impl HeapType {
    const ALL: [HeapType; 4] = [
        HeapType::CbvSrvUav,
        HeapType::Rtv,
        HeapType::Dsv,
        HeapType::Sampler,
    ];

    fn default_capacity(self) -> u32 {
        match self {
            HeapType::CbvSrvUav => descriptor_heap_defaults::CBV_SRV_UAV_CAPACITY,
            HeapType::Rtv => descriptor_heap_defaults::RTV_CAPACITY,
            HeapType::Dsv => descriptor_heap_defaults::DSV_CAPACITY,
            HeapType::Sampler => descriptor_heap_defaults::SAMPLER_CAPACITY,
        }
    }
}

/// Opaque CPU-visible descriptor handle. Backend-specific payload is not
/// modeled; the value is unique per (heap_type, heap_index) pair.
pub type CpuHandle = u64;
/// Opaque GPU-visible descriptor handle, valid only for shader-visible heaps.
pub type GpuHandle = u64;

/// A single descriptor slot allocation. Default-constructed value is
/// invalid (`valid == false`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorAllocation {
    pub cpu_handle: CpuHandle,
    pub gpu_handle: GpuHandle,
    pub heap_index: u32,
    pub heap_type: HeapType,
    pub valid: bool,
}

impl DescriptorAllocation {
    pub fn invalid(heap_type: HeapType) -> Self {
        Self {
            cpu_handle: 0,
            gpu_handle: 0,
            heap_index: 0,
            heap_type,
            valid: false,
        }
    }
}

/// Usage snapshot for one heap, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct HeapStats {
    pub heap_type: HeapType,
    pub capacity: u32,
    pub used: u32,
    pub peak_used: u32,
    pub usage_ratio: f32,
}

struct Heap {
    capacity: u32,
    used: BitVec,
    used_count: u32,
    peak_used: u32,
    next_free: u32,
}

impl Heap {
    fn new(capacity: u32) -> Self {
        Self {
            capacity,
            used: BitVec::from_elem(capacity as usize, false),
            used_count: 0,
            peak_used: 0,
            next_free: 0,
        }
    }

    /// Finds and claims the next free slot, searching from `next_free`,
    /// wrapping once. Advances `next_free` past whatever it found.
    fn allocate_index(&mut self) -> Option<u32> {
        if self.used_count >= self.capacity {
            return None;
        }
        let cap = self.capacity;
        for offset in 0..cap {
            let idx = (self.next_free + offset) % cap;
            if !self.used[idx as usize] {
                self.used.set(idx as usize, true);
                self.used_count += 1;
                self.peak_used = self.peak_used.max(self.used_count);
                self.next_free = idx + 1;
                return Some(idx);
            }
        }
        None
    }

    /// Claims `count` consecutive free slots starting exactly at
    /// `next_free`; no wraparound for ranges.
    fn allocate_range(&mut self, count: u32) -> Option<u32> {
        if count == 0 || self.next_free + count > self.capacity {
            return None;
        }
        let start = self.next_free;
        for i in start..start + count {
            if self.used[i as usize] {
                return None;
            }
        }
        for i in start..start + count {
            self.used.set(i as usize, true);
        }
        self.used_count += count;
        self.peak_used = self.peak_used.max(self.used_count);
        self.next_free = start + count;
        Some(start)
    }

    fn free(&mut self, index: u32) -> bool {
        if index >= self.capacity || !self.used[index as usize] {
            return false;
        }
        self.used.set(index as usize, false);
        self.used_count -= 1;
        true
    }

    fn free_range(&mut self, start: u32, count: u32) -> bool {
        if count == 0 || start + count > self.capacity {
            return false;
        }
        for i in start..start + count {
            if !self.used[i as usize] {
                return false;
            }
        }
        for i in start..start + count {
            self.used.set(i as usize, false);
        }
        self.used_count -= count;
        true
    }

    fn stats(&self, heap_type: HeapType) -> HeapStats {
        HeapStats {
            heap_type,
            capacity: self.capacity,
            used: self.used_count,
            peak_used: self.peak_used,
            usage_ratio: self.used_count as f32 / self.capacity.max(1) as f32,
        }
    }
}

/// Synthesizes a unique opaque handle from a heap type and index. Real
/// backends would offset a base pointer by `index * increment_size`; this
/// engine only needs the handle to be stable and comparable.
fn synth_handle(heap_type: HeapType, index: u32) -> u64 {
    let tag = match heap_type {
        HeapType::CbvSrvUav => 0u64,
        HeapType::Rtv => 1u64,
        HeapType::Dsv => 2u64,
        HeapType::Sampler => 3u64,
    };
    (tag << 32) | index as u64
}

/// Owns all four descriptor heaps for one GPU device. Each heap's mutable
/// state is behind its own mutex so unrelated heap types never contend.
pub struct DescriptorHeapAllocator {
    heaps: [Mutex<Heap>; 4],
}

impl DescriptorHeapAllocator {
    pub fn new() -> Self {
        Self::with_capacities(
            descriptor_heap_defaults::CBV_SRV_UAV_CAPACITY,
            descriptor_heap_defaults::RTV_CAPACITY,
            descriptor_heap_defaults::DSV_CAPACITY,
            descriptor_heap_defaults::SAMPLER_CAPACITY,
        )
    }

    pub fn with_capacities(cbv_srv_uav: u32, rtv: u32, dsv: u32, sampler: u32) -> Self {
        Self {
            heaps: [
                Mutex::new(Heap::new(cbv_srv_uav)),
                Mutex::new(Heap::new(rtv)),
                Mutex::new(Heap::new(dsv)),
                Mutex::new(Heap::new(sampler)),
            ],
        }
    }

    fn heap_slot(heap_type: HeapType) -> usize {
        match heap_type {
            HeapType::CbvSrvUav => 0,
            HeapType::Rtv => 1,
            HeapType::Dsv => 2,
            HeapType::Sampler => 3,
        }
    }

    /// Finds the next free index for `heap_type`, marks it used, and
    /// returns a fully populated allocation. Fails with `HeapExhausted` if
    /// the heap has no free slot after a full pass.
    pub fn allocate(&self, heap_type: HeapType) -> EngineResult<DescriptorAllocation> {
        let mut heap = self.heaps[Self::heap_slot(heap_type)].lock();
        let index = heap.allocate_index().ok_or(EngineError::HeapExhausted {
            heap_type,
            capacity: heap.capacity,
        })?;
        let gpu_handle = if heap_type == HeapType::CbvSrvUav {
            synth_handle(heap_type, index)
        } else {
            0
        };
        Ok(DescriptorAllocation {
            cpu_handle: synth_handle(heap_type, index),
            gpu_handle,
            heap_index: index,
            heap_type,
            valid: true,
        })
    }

    /// Allocates `count` consecutive indices in one pass, no wraparound.
    /// Returns the allocation for the base index.
    pub fn allocate_range(
        &self,
        heap_type: HeapType,
        count: u32,
    ) -> EngineResult<DescriptorAllocation> {
        let mut heap = self.heaps[Self::heap_slot(heap_type)].lock();
        let available = heap.capacity - heap.used_count;
        let start = heap
            .allocate_range(count)
            .ok_or(EngineError::InsufficientSpace {
                heap_type,
                requested: count,
                available,
            })?;
        let gpu_handle = if heap_type == HeapType::CbvSrvUav {
            synth_handle(heap_type, start)
        } else {
            0
        };
        Ok(DescriptorAllocation {
            cpu_handle: synth_handle(heap_type, start),
            gpu_handle,
            heap_index: start,
            heap_type,
            valid: true,
        })
    }

    /// Clears the used bit for `allocation`. `next_free` is left
    /// unchanged; the rover naturally re-encounters the hole on wrap.
    pub fn free(&self, allocation: DescriptorAllocation) -> EngineResult<()> {
        if !allocation.valid {
            return Ok(());
        }
        let mut heap = self.heaps[Self::heap_slot(allocation.heap_type)].lock();
        if allocation.heap_index >= heap.capacity || !heap.free(allocation.heap_index) {
            log::warn!(
                "free of invalid allocation: {:?} index {}",
                allocation.heap_type,
                allocation.heap_index
            );
            return Err(EngineError::InvalidAllocation {
                heap_type: allocation.heap_type,
                index: allocation.heap_index,
            });
        }
        Ok(())
    }

    pub fn free_range(&self, heap_type: HeapType, base_index: u32, count: u32) -> EngineResult<()> {
        let mut heap = self.heaps[Self::heap_slot(heap_type)].lock();
        if !heap.free_range(base_index, count) {
            return Err(EngineError::InvalidAllocation {
                heap_type,
                index: base_index,
            });
        }
        Ok(())
    }

    /// Binds the shader-visible heaps to the command encoder. No-op on the
    /// wgpu backend (resources are bound per draw via bind groups); kept
    /// so call sites read the same as the original command-list contract.
    pub fn set_descriptor_heaps(&self, _encoder: &wgpu::CommandEncoder) {
        log::trace!("set_descriptor_heaps: no-op on wgpu backend");
    }

    pub fn has_enough_space(&self, heap_type: HeapType, count: u32) -> bool {
        let heap = self.heaps[Self::heap_slot(heap_type)].lock();
        heap.capacity - heap.used_count >= count
    }

    pub fn stats(&self, heap_type: HeapType) -> HeapStats {
        let heap = self.heaps[Self::heap_slot(heap_type)].lock();
        heap.stats(heap_type)
    }

    pub fn all_stats(&self) -> Vec<HeapStats> {
        HeapType::ALL.iter().map(|&ht| self.stats(ht)).collect()
    }
}

impl Default for DescriptorHeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_then_free_recycles_on_wrap() {
        let allocator = DescriptorHeapAllocator::with_capacities(4, 4, 4, 4);
        let a = allocator.allocate(HeapType::Rtv).unwrap();
        let b = allocator.allocate(HeapType::Rtv).unwrap();
        assert_eq!(a.heap_index, 0);
        assert_eq!(b.heap_index, 1);
        allocator.free(a).unwrap();
        let c = allocator.allocate(HeapType::Rtv).unwrap();
        let d = allocator.allocate(HeapType::Rtv).unwrap();
        assert_eq!(c.heap_index, 2);
        // wrapped past the end, finds the freed slot 0
        assert_eq!(d.heap_index, 0);
    }

    #[test]
    fn heap_exhausted_when_full() {
        let allocator = DescriptorHeapAllocator::with_capacities(2, 2, 2, 2);
        allocator.allocate(HeapType::Dsv).unwrap();
        allocator.allocate(HeapType::Dsv).unwrap();
        let err = allocator.allocate(HeapType::Dsv).unwrap_err();
        assert!(matches!(err, EngineError::HeapExhausted { .. }));
    }

    #[test]
    fn allocate_range_requires_contiguous_unwrapped_space() {
        let allocator = DescriptorHeapAllocator::with_capacities(8, 8, 8, 8);
        let base = allocator.allocate_range(HeapType::CbvSrvUav, 4).unwrap();
        assert_eq!(base.heap_index, 0);
        let err = allocator
            .allocate_range(HeapType::CbvSrvUav, 5)
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientSpace { .. }));
    }

    #[test]
    fn free_invalid_allocation_is_reported_not_fatal() {
        let allocator = DescriptorHeapAllocator::with_capacities(4, 4, 4, 4);
        let stray = DescriptorAllocation {
            cpu_handle: 0,
            gpu_handle: 0,
            heap_index: 1,
            heap_type: HeapType::Sampler,
            valid: true,
        };
        let err = allocator.free(stray).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAllocation { .. }));
    }

    #[test]
    fn free_default_invalid_allocation_is_noop() {
        let allocator = DescriptorHeapAllocator::new();
        let invalid = DescriptorAllocation::invalid(HeapType::Rtv);
        assert!(allocator.free(invalid).is_ok());
    }
}
