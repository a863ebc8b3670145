//! Bindless Resource Manager: maps each registered GPU resource to a
//! stable bindless index backed by the shader-visible CBV/SRV/UAV heap.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::constants::bindless_defaults;
use crate::error::{EngineError, EngineResult};
use crate::gpu::descriptor_handle::DescriptorHandle;
use crate::gpu::descriptor_heap::{DescriptorHeapAllocator, GpuHandle, HeapType};

/// Stable identity of a GPU resource, independent of the Rust value that
/// wraps it. The original engine keys off the raw resource pointer; here
/// the caller supplies a stable id (e.g. derived from the backend's own
/// resource identity) since `wgpu` handles are not hashable by pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuResourceId(pub u64);

/// Metadata tag passed at registration time. The manager stores it for
/// diagnostics but does not interpret it further (`RegisterTexture2D`'s
/// `type` parameter is inert metadata in the source engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindlessKind {
    Texture2D,
    Buffer,
}

struct Registration {
    handle: DescriptorHandle,
    kind: BindlessKind,
}

/// Diagnostics snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindlessStats {
    pub current: u64,
    pub peak: u64,
    pub total_registered: u64,
}

pub struct BindlessResourceManager {
    allocator: Arc<DescriptorHeapAllocator>,
    resource_to_index: DashMap<GpuResourceId, u32>,
    index_to_registration: DashMap<u32, Registration>,
    max_capacity: u32,
    growth_factor: u32,
    counters: Mutex<BindlessStats>,
}

impl BindlessResourceManager {
    pub fn new(allocator: Arc<DescriptorHeapAllocator>) -> Self {
        Self::with_limits(
            allocator,
            bindless_defaults::INITIAL_CAPACITY,
            bindless_defaults::MAX_CAPACITY,
            bindless_defaults::GROWTH_FACTOR,
        )
    }

    pub fn with_limits(
        allocator: Arc<DescriptorHeapAllocator>,
        _initial_capacity: u32,
        max_capacity: u32,
        growth_factor: u32,
    ) -> Self {
        Self {
            allocator,
            resource_to_index: DashMap::new(),
            index_to_registration: DashMap::new(),
            max_capacity,
            growth_factor,
            counters: Mutex::new(BindlessStats::default()),
        }
    }

    /// Registers a 2D texture. Repeat registration of an already-known
    /// resource returns the existing index and logs a warning rather than
    /// allocating a new slot.
    pub fn register_texture_2d(&self, resource: GpuResourceId) -> EngineResult<u32> {
        self.register(resource, BindlessKind::Texture2D)
    }

    pub fn register_buffer(&self, resource: GpuResourceId) -> EngineResult<u32> {
        self.register(resource, BindlessKind::Buffer)
    }

    fn register(&self, resource: GpuResourceId, kind: BindlessKind) -> EngineResult<u32> {
        if let Some(existing) = self.resource_to_index.get(&resource) {
            log::warn!(
                "resource {:?} already registered at index {}; returning existing index",
                resource,
                *existing
            );
            return Ok(*existing);
        }

        {
            let counters = self.counters.lock();
            if counters.current as u32 >= self.max_capacity {
                return Err(EngineError::BindlessCapacityExceeded {
                    max_capacity: self.max_capacity,
                });
            }
        }

        if !self
            .allocator
            .has_enough_space(HeapType::CbvSrvUav, 1)
        {
            self.grow();
        }

        let allocation = self.allocator.allocate(HeapType::CbvSrvUav)?;
        let handle = DescriptorHandle::new(allocation, &self.allocator);
        let index = allocation.heap_index;

        self.resource_to_index.insert(resource, index);
        self.index_to_registration
            .insert(index, Registration { handle, kind });

        let mut counters = self.counters.lock();
        counters.current += 1;
        counters.total_registered += 1;
        counters.peak = counters.peak.max(counters.current);

        Ok(index)
    }

    /// Growth is expensive and, on a real backend, would create a larger
    /// shader-visible heap and copy existing descriptors across while
    /// stalling command-list recording. This bookkeeping layer has no
    /// descriptors to copy, so growth here is a logged no-op: the heap
    /// itself owns its fixed capacity and callers are expected to size it
    /// via configuration up front.
    fn grow(&self) {
        log::warn!(
            "bindless resource manager approaching capacity; configured growth_factor={} has no effect without reallocating the underlying heap",
            self.growth_factor
        );
    }

    /// Releases the slot and removes bookkeeping for `resource`. Returns
    /// `true` if the resource was registered.
    pub fn unregister(&self, resource: GpuResourceId) -> bool {
        let Some((_, index)) = self.resource_to_index.remove(&resource) else {
            return false;
        };
        if self.index_to_registration.remove(&index).is_some() {
            let mut counters = self.counters.lock();
            counters.current = counters.current.saturating_sub(1);
        }
        true
    }

    pub fn get_gpu_handle_by_index(&self, index: u32) -> Option<GpuHandle> {
        self.index_to_registration
            .get(&index)
            .map(|r| r.handle.allocation().gpu_handle)
    }

    pub fn kind_of(&self, index: u32) -> Option<BindlessKind> {
        self.index_to_registration.get(&index).map(|r| r.kind)
    }

    pub fn index_of(&self, resource: GpuResourceId) -> Option<u32> {
        self.resource_to_index.get(&resource).map(|i| *i)
    }

    /// Binds the shader-visible heap's descriptor table. No-op on the wgpu
    /// backend; kept for interface parity with the root-descriptor-table
    /// contract.
    pub fn set_descriptor_table(
        &self,
        _encoder: &wgpu::CommandEncoder,
        root_param: u32,
        start_index: u32,
        count: u32,
    ) {
        log::trace!(
            "set_descriptor_table(root_param={}, start={}, count={}): no-op on wgpu backend",
            root_param,
            start_index,
            count
        );
    }

    pub fn stats(&self) -> BindlessStats {
        *self.counters.lock()
    }
}
