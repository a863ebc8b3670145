//! Descriptor Handle: scoped ownership of a `DescriptorAllocation` that
//! frees it automatically on drop, without keeping the allocator alive.

use std::cmp::Ordering;
use std::sync::{Arc, Weak};

use crate::gpu::descriptor_heap::{DescriptorAllocation, DescriptorHeapAllocator, HeapType};

/// Owns a `DescriptorAllocation` plus a weak reference to the allocator it
/// came from. Dropping a handle that was not moved-from and not detached
/// returns its slot to the allocator's free list. If the allocator has
/// already been destroyed, the drop is a silent no-op rather than a panic.
pub struct DescriptorHandle {
    allocation: DescriptorAllocation,
    allocator: Weak<DescriptorHeapAllocator>,
    /// Non-owning handles observe the allocation but never free it.
    owning: bool,
}

impl DescriptorHandle {
    pub fn new(allocation: DescriptorAllocation, allocator: &Arc<DescriptorHeapAllocator>) -> Self {
        Self {
            allocation,
            allocator: Arc::downgrade(allocator),
            owning: true,
        }
    }

    /// Creates a handle that observes `allocation` but never frees it, even
    /// on drop. Used for aliases (e.g. a non-flipping render target's Alt
    /// texture aliasing Main).
    pub fn non_owning(allocation: DescriptorAllocation, allocator: &Arc<DescriptorHeapAllocator>) -> Self {
        Self {
            allocation,
            allocator: Arc::downgrade(allocator),
            owning: false,
        }
    }

    pub fn allocation(&self) -> DescriptorAllocation {
        self.allocation
    }

    pub fn heap_type(&self) -> HeapType {
        self.allocation.heap_type
    }

    pub fn heap_index(&self) -> u32 {
        self.allocation.heap_index
    }

    pub fn is_valid(&self) -> bool {
        self.allocation.valid
    }

    /// Releases the allocation immediately instead of waiting for drop.
    /// Safe to call more than once; subsequent calls are no-ops.
    pub fn release(&mut self) {
        if self.owning && self.allocation.valid {
            if let Some(allocator) = self.allocator.upgrade() {
                if let Err(e) = allocator.free(self.allocation) {
                    log::warn!("DescriptorHandle::release failed: {}", e);
                }
            }
            self.allocation.valid = false;
        }
    }
}

impl Drop for DescriptorHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl PartialEq for DescriptorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.heap_type() == other.heap_type() && self.heap_index() == other.heap_index()
    }
}
impl Eq for DescriptorHandle {}

impl PartialOrd for DescriptorHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DescriptorHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        fn heap_rank(h: HeapType) -> u8 {
            match h {
                HeapType::CbvSrvUav => 0,
                HeapType::Rtv => 1,
                HeapType::Dsv => 2,
                HeapType::Sampler => 3,
            }
        }
        heap_rank(self.heap_type())
            .cmp(&heap_rank(other.heap_type()))
            .then(self.heap_index().cmp(&other.heap_index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_frees_exactly_once() {
        let allocator = Arc::new(DescriptorHeapAllocator::with_capacities(4, 4, 4, 4));
        let allocation = allocator.allocate(HeapType::Rtv).unwrap();
        {
            let _handle = DescriptorHandle::new(allocation, &allocator);
        }
        // slot must be free again
        let reallocated = allocator.allocate(HeapType::Rtv).unwrap();
        assert_eq!(reallocated.heap_index, allocation.heap_index);
    }

    #[test]
    fn handle_outliving_allocator_is_noop() {
        let allocator = Arc::new(DescriptorHeapAllocator::with_capacities(4, 4, 4, 4));
        let allocation = allocator.allocate(HeapType::Dsv).unwrap();
        let handle = DescriptorHandle::new(allocation, &allocator);
        drop(allocator);
        drop(handle); // must not panic
    }

    #[test]
    fn non_owning_handle_never_frees() {
        let allocator = Arc::new(DescriptorHeapAllocator::with_capacities(4, 4, 4, 4));
        let allocation = allocator.allocate(HeapType::Sampler).unwrap();
        {
            let _alias = DescriptorHandle::non_owning(allocation, &allocator);
        }
        let err = allocator.allocate(HeapType::Sampler);
        // capacity 4, only one slot used and not freed by the non-owning handle
        assert!(err.is_ok());
        assert_eq!(allocator.stats(HeapType::Sampler).used, 2);
    }

    #[test]
    fn ordering_is_lexicographic_heap_then_index() {
        let allocator = Arc::new(DescriptorHeapAllocator::with_capacities(4, 4, 4, 4));
        let a = DescriptorHandle::new(allocator.allocate(HeapType::Rtv).unwrap(), &allocator);
        let b = DescriptorHandle::new(allocator.allocate(HeapType::Rtv).unwrap(), &allocator);
        assert!(a < b);
    }
}
