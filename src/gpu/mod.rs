//! GPU-facing bookkeeping: descriptor heaps, scoped handles, and the
//! bindless resource registry built on top of them.

pub mod bindless;
pub mod descriptor_handle;
pub mod descriptor_heap;

pub use bindless::{BindlessKind, BindlessResourceManager, BindlessStats, GpuResourceId};
pub use descriptor_handle::DescriptorHandle;
pub use descriptor_heap::{DescriptorAllocation, DescriptorHeapAllocator, HeapStats, HeapType};
